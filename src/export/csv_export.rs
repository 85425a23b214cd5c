use crate::error::ExportError;
use crate::models::{JoinedRow, UnmatchedName};
use crate::orchestrator::summary::RunSummary;
use csv::{Writer, WriterBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const EXTRACTED_NAME_COL: &str = "EXTRACTED_NAME";
pub const MATCHED_EXTRACTED_NAME_COL: &str = "MATCHED_EXTRACTED_NAME";

fn buffered(path: &Path) -> Result<BufWriter<File>, ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::with_capacity(512 * 1024, File::create(path)?))
}

/// Header for a partition file: the extracted name, every reference column in
/// table order, then the matched-name echo column.
pub fn partition_headers(reference_columns: &[String]) -> Vec<&str> {
    let mut headers = Vec::with_capacity(reference_columns.len() + 2);
    headers.push(EXTRACTED_NAME_COL);
    headers.extend(reference_columns.iter().map(String::as_str));
    headers.push(MATCHED_EXTRACTED_NAME_COL);
    headers
}

fn write_row<W: Write>(
    w: &mut Writer<W>,
    row: &JoinedRow,
    reference_columns: &[String],
) -> Result<(), ExportError> {
    let name = row.extracted_name();
    let mut record: Vec<&str> = Vec::with_capacity(reference_columns.len() + 2);
    record.push(name);
    for col in reference_columns {
        record.push(row.reference.get(col).unwrap_or(""));
    }
    record.push(name);
    w.write_record(&record)?;
    Ok(())
}

pub fn write_partition_csv<W: Write>(
    out: W,
    rows: &[JoinedRow],
    reference_columns: &[String],
) -> Result<(), ExportError> {
    let mut w = WriterBuilder::new().from_writer(out);
    w.write_record(partition_headers(reference_columns))?;
    for row in rows {
        write_row(&mut w, row, reference_columns)?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_partition_csv(
    path: &Path,
    rows: &[JoinedRow],
    reference_columns: &[String],
) -> Result<(), ExportError> {
    write_partition_csv(buffered(path)?, rows, reference_columns)
}

pub fn write_unmatched_csv<W: Write>(out: W, names: &[UnmatchedName]) -> Result<(), ExportError> {
    let mut w = WriterBuilder::new().from_writer(out);
    w.write_record(["LINE_INDEX", EXTRACTED_NAME_COL, "MATCH_KEY"])?;
    for n in names {
        let idx = n.candidate.index.to_string();
        w.write_record([idx.as_str(), n.candidate.as_str(), n.key.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_unmatched_csv(path: &Path, names: &[UnmatchedName]) -> Result<(), ExportError> {
    write_unmatched_csv(buffered(path)?, names)
}

pub fn write_summary_csv<W: Write>(out: W, summary: &RunSummary) -> Result<(), ExportError> {
    let mut w = WriterBuilder::new().from_writer(out);
    w.write_record(["Metric", "Value"])?;
    for (k, v) in summary.rows() {
        w.write_record([k.as_str(), v.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn export_summary_csv(path: &Path, summary: &RunSummary) -> Result<(), ExportError> {
    write_summary_csv(buffered(path)?, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchKey, NameCandidate, ReferenceRecord};

    fn row(name: &str, fields: &[(&str, &str)]) -> JoinedRow {
        let mut reference = ReferenceRecord::default();
        for (k, v) in fields {
            reference.fields.insert(k.to_string(), v.to_string());
        }
        JoinedRow {
            candidate: NameCandidate::present(0, name),
            reference,
        }
    }

    #[test]
    fn partition_layout_and_quoting() {
        let cols = vec!["E_NAME".to_string(), "ACCOUNT".to_string(), "NOTE".to_string()];
        let rows = vec![
            row("JOHN SMITH", &[("E_NAME", "JOHN  SMITH"), ("ACCOUNT", "A1")]),
            row("ANN LEE", &[("E_NAME", "ANN LEE"), ("NOTE", "a, b")]),
        ];
        let mut buf = Vec::new();
        write_partition_csv(&mut buf, &rows, &cols).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "EXTRACTED_NAME,E_NAME,ACCOUNT,NOTE,MATCHED_EXTRACTED_NAME");
        assert_eq!(lines[1], "JOHN SMITH,JOHN  SMITH,A1,,JOHN SMITH");
        assert_eq!(lines[2], "ANN LEE,ANN LEE,,\"a, b\",ANN LEE");
    }

    #[test]
    fn empty_partition_still_has_header() {
        let cols = vec!["E_NAME".to_string()];
        let mut buf = Vec::new();
        write_partition_csv(&mut buf, &[], &cols).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "EXTRACTED_NAME,E_NAME,MATCHED_EXTRACTED_NAME\n"
        );
    }

    #[test]
    fn unmatched_layout() {
        let names = vec![UnmatchedName {
            candidate: NameCandidate::present(4, "NOBODY HERE"),
            key: MatchKey("NOBODY||HERE".into()),
        }];
        let mut buf = Vec::new();
        write_unmatched_csv(&mut buf, &names).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "LINE_INDEX,EXTRACTED_NAME,MATCH_KEY\n4,NOBODY HERE,NOBODY||HERE\n"
        );
    }

    #[test]
    fn export_creates_missing_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("matched_unique.csv");
        export_partition_csv(&path, &[], &["E_NAME".to_string()]).unwrap();
        assert!(path.exists());
    }
}
