//! Output artifacts: one CSV per partition, the issuance workbook and the run summary.

pub mod csv_export;
pub mod xlsx_export;

pub const DUPLICATE_CSV: &str = "duplicate_matches.csv";
pub const MISMATCHED_CSV: &str = "mismatched_lengths.csv";
pub const MATCHED_UNIQUE_CSV: &str = "matched_unique.csv";
pub const UNMATCHED_CSV: &str = "unmatched_names.csv";
pub const ISSUANCE_XLSX: &str = "mismatched_output.xlsx";
pub const SUMMARY_CSV: &str = "run_summary.csv";
