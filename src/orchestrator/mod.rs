//! Orchestrator module: one reconciliation run from input files to artifacts.
//!
//! [`process`] is the pure part: bytes in, classified partitions out. [`run`]
//! wraps it with file reading, artifact export and the run summary.

pub mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{error, info, warn};

use crate::config::{AppConfig, MatchingConfig};
use crate::error::{ConfigError, ExportError};
use crate::export::csv_export::{export_partition_csv, export_summary_csv, export_unmatched_csv};
use crate::export::xlsx_export::export_issuance_xlsx;
use crate::export::{
    DUPLICATE_CSV, ISSUANCE_XLSX, MATCHED_UNIQUE_CSV, MISMATCHED_CSV, SUMMARY_CSV, UNMATCHED_CSV,
};
use crate::ingest::{
    NameExtractor, ReferenceLoad, TextLoad, extract_candidates, load_reference_tables,
};
use crate::matching::{ClassificationResult, UnmatchedPolicy, classify};
use crate::metrics::sample_memory;
use crate::models::{InputFile, ReferenceTable};
use self::summary::{FileFailure, RunSummary, SummaryBuilder};

pub const STATUS_COMPLETE: &str = "complete";
pub const STATUS_WAITING: &str = "waiting for both inputs";

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// At least one input kind produced nothing usable; nothing was classified.
    Waiting {
        missing_text: bool,
        missing_reference: bool,
    },
    Classified(Box<ClassificationResult>),
}

impl RunOutcome {
    pub fn classification(&self) -> Option<&ClassificationResult> {
        match self {
            Self::Classified(res) => Some(res),
            Self::Waiting { .. } => None,
        }
    }
}

#[derive(Debug)]
pub struct ProcessOutput {
    pub text: TextLoad,
    pub reference: ReferenceLoad,
    pub outcome: RunOutcome,
}

impl ProcessOutput {
    /// Column order for partition exports.
    pub fn reference_table(&self) -> &ReferenceTable {
        &self.reference.table
    }
}

/// Extract, load, join and classify. File-level failures are recorded in the
/// loads, never returned; the only error is an unusable marker.
pub fn process(
    text_inputs: &[InputFile],
    reference_inputs: &[InputFile],
    cfg: &MatchingConfig,
) -> Result<ProcessOutput, ConfigError> {
    let extractor = NameExtractor::new(&cfg.marker)?;
    let text = extract_candidates(&extractor, text_inputs);
    let reference = load_reference_tables(reference_inputs);

    // A text load counts once it yields candidates; a reference load once any file parsed.
    let missing_text = text.candidates.is_empty();
    let missing_reference = reference.loaded.is_empty();
    let outcome = if missing_text || missing_reference {
        warn!(
            "Waiting for both inputs (text: {}, reference: {})",
            if missing_text { "missing" } else { "ok" },
            if missing_reference { "missing" } else { "ok" }
        );
        RunOutcome::Waiting {
            missing_text,
            missing_reference,
        }
    } else {
        let res = classify(&text.candidates, &reference.table, &cfg.match_options());
        RunOutcome::Classified(Box::new(res))
    };
    Ok(ProcessOutput {
        text,
        reference,
        outcome,
    })
}

/// Write every partition artifact into `out_dir`. Returns the written paths.
pub fn write_artifacts(
    res: &ClassificationResult,
    reference_columns: &[String],
    policy: UnmatchedPolicy,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, ExportError> {
    std::fs::create_dir_all(out_dir)?;
    let mut written = Vec::new();
    for (file, rows) in [
        (DUPLICATE_CSV, &res.duplicate),
        (MISMATCHED_CSV, &res.length_mismatched),
        (MATCHED_UNIQUE_CSV, &res.matched_unique),
    ] {
        let path = out_dir.join(file);
        export_partition_csv(&path, rows, reference_columns)?;
        written.push(path);
    }
    let xlsx = out_dir.join(ISSUANCE_XLSX);
    export_issuance_xlsx(&xlsx, &res.issuance)?;
    written.push(xlsx);
    if policy == UnmatchedPolicy::Report {
        let path = out_dir.join(UNMATCHED_CSV);
        export_unmatched_csv(&path, &res.unmatched)?;
        written.push(path);
    }
    Ok(written)
}

/// Read files from disk in order; unreadable files are logged and skipped.
pub fn read_input_files(paths: &[String]) -> (Vec<InputFile>, Vec<FileFailure>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut failures = Vec::new();
    for p in paths {
        match std::fs::read(p) {
            Ok(bytes) => files.push(InputFile::new(p.clone(), bytes)),
            Err(e) => {
                error!("Error reading {}: {}", p, e);
                failures.push(FileFailure {
                    file: p.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    (files, failures)
}

#[derive(Debug)]
pub struct RunReport {
    pub output: ProcessOutput,
    pub summary: RunSummary,
    pub artifacts: Vec<PathBuf>,
}

/// Full run from an [`AppConfig`]: read inputs, process, export.
pub fn run(cfg: &AppConfig) -> Result<RunReport> {
    let started = chrono::Utc::now();
    let mem_start = sample_memory();

    let (text_files, text_read_failures) = read_input_files(&cfg.input.text_files);
    let (reference_files, reference_read_failures) = read_input_files(&cfg.input.reference_files);
    let output = process(&text_files, &reference_files, &cfg.matching)?;

    let out_dir = Path::new(&cfg.export.out_dir);
    let policy = cfg.matching.unmatched_policy;
    let mut artifacts = Vec::new();
    let mut builder = SummaryBuilder::new(started)
        .with_policy(policy)
        .with_read_failures(&text_read_failures, &reference_read_failures)
        .with_text(&output.text)
        .with_reference(&output.reference);
    let status = match &output.outcome {
        RunOutcome::Classified(res) => {
            artifacts = write_artifacts(res, &output.reference_table().columns, policy, out_dir)
                .with_context(|| format!("writing results to {}", out_dir.display()))?;
            builder = builder.with_classification(res);
            STATUS_COMPLETE
        }
        RunOutcome::Waiting { .. } => STATUS_WAITING,
    };

    let summary = builder
        .with_memory(mem_start, sample_memory())
        .build(status, chrono::Utc::now());
    summary.log();
    if cfg.export.write_summary {
        let path = out_dir.join(SUMMARY_CSV);
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("creating {}", out_dir.display()))?;
        export_summary_csv(&path, &summary)
            .with_context(|| format!("writing {}", path.display()))?;
        artifacts.push(path);
    }
    for a in &artifacts {
        info!("Wrote {}", a.display());
    }
    Ok(RunReport {
        output,
        summary,
        artifacts,
    })
}
