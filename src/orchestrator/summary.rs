//! Run summary: counts per stage, file outcomes, timing and memory.

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::ingest::{ReferenceLoad, TextLoad};
use crate::matching::{ClassificationResult, UnmatchedPolicy};
use crate::metrics::MemorySample;

/// A file that was skipped, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    pub file: String,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub status: String,
    pub text_files_loaded: Vec<String>,
    pub text_files_failed: Vec<FileFailure>,
    pub reference_files_loaded: Vec<String>,
    pub reference_files_failed: Vec<FileFailure>,
    pub reference_rows: usize,
    pub extracted_names: usize,
    pub names_with_marker: usize,
    pub matched_rows: usize,
    pub duplicate_rows: usize,
    pub unique_rows: usize,
    pub mismatched_rows: usize,
    pub matched_unique_rows: usize,
    pub unmatched_policy: UnmatchedPolicy,
    pub unmatched_names: usize,
    pub issuance_rows: usize,
    pub issuance_date_failures: usize,
    pub started_utc: DateTime<Utc>,
    pub ended_utc: DateTime<Utc>,
    pub duration_secs: f64,
    pub mem_used_start_mb: u64,
    pub mem_used_end_mb: u64,
}

fn join_names(names: &[String]) -> String {
    names.join("; ")
}

fn join_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.file, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl RunSummary {
    /// Key/value rows in display order.
    pub fn rows(&self) -> Vec<(String, String)> {
        let fmt_time = |dt: &DateTime<Utc>| format!("{} UTC", dt.format("%Y-%m-%d %H:%M:%S"));
        let mut rows: Vec<(&str, String)> = vec![
            ("Status", self.status.clone()),
            ("Text files loaded", join_names(&self.text_files_loaded)),
            ("Text files failed", join_failures(&self.text_files_failed)),
            ("Reference files loaded", join_names(&self.reference_files_loaded)),
            ("Reference files failed", join_failures(&self.reference_files_failed)),
            ("Original HCS rows", self.reference_rows.to_string()),
            ("Extracted names", self.extracted_names.to_string()),
            ("Lines with a name marker", self.names_with_marker.to_string()),
            ("Matched rows before splitting", self.matched_rows.to_string()),
            ("Rows with duplicate ACCOUNT and EXTRACTED_NAME", self.duplicate_rows.to_string()),
            ("Unique or non-duplicate rows", self.unique_rows.to_string()),
            ("Rows with mismatched lengths", self.mismatched_rows.to_string()),
            ("Rows with matched lengths", self.matched_unique_rows.to_string()),
            ("Unmatched policy", self.unmatched_policy.to_string()),
        ];
        if self.unmatched_policy == UnmatchedPolicy::Report {
            rows.push(("Unmatched names", self.unmatched_names.to_string()));
        }
        rows.extend([
            ("Issuance rows", self.issuance_rows.to_string()),
            ("Issuance rows skipped (bad expiry)", self.issuance_date_failures.to_string()),
            ("Started", fmt_time(&self.started_utc)),
            ("Ended", fmt_time(&self.ended_utc)),
            ("Duration (s)", format!("{:.3}", self.duration_secs)),
            ("Memory used start (MB)", self.mem_used_start_mb.to_string()),
            ("Memory used end (MB)", self.mem_used_end_mb.to_string()),
        ]);
        rows.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    pub fn log(&self) {
        info!("Original HCS rows: {}", self.reference_rows);
        info!("Extracted names: {}", self.extracted_names);
        info!("Matched rows before splitting: {}", self.matched_rows);
        info!(
            "Rows with duplicate ACCOUNT and EXTRACTED_NAME: {}",
            self.duplicate_rows
        );
        info!("Unique or non-duplicate rows: {}", self.unique_rows);
        info!("Rows with mismatched lengths: {}", self.mismatched_rows);
        info!("Rows with matched lengths: {}", self.matched_unique_rows);
        if self.unmatched_policy == UnmatchedPolicy::Report {
            info!("Unmatched names: {}", self.unmatched_names);
        }
        let failed = self.text_files_failed.len() + self.reference_files_failed.len();
        if failed > 0 {
            warn!("{} input file(s) were skipped", failed);
        }
        info!("Status: {} ({:.3}s)", self.status, self.duration_secs);
    }
}

/// Accumulates stage results into a [`RunSummary`].
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    inner: RunSummary,
}

impl SummaryBuilder {
    pub fn new(started_utc: DateTime<Utc>) -> Self {
        Self {
            inner: RunSummary {
                status: String::new(),
                text_files_loaded: Vec::new(),
                text_files_failed: Vec::new(),
                reference_files_loaded: Vec::new(),
                reference_files_failed: Vec::new(),
                reference_rows: 0,
                extracted_names: 0,
                names_with_marker: 0,
                matched_rows: 0,
                duplicate_rows: 0,
                unique_rows: 0,
                mismatched_rows: 0,
                matched_unique_rows: 0,
                unmatched_policy: UnmatchedPolicy::Drop,
                unmatched_names: 0,
                issuance_rows: 0,
                issuance_date_failures: 0,
                started_utc,
                ended_utc: started_utc,
                duration_secs: 0.0,
                mem_used_start_mb: 0,
                mem_used_end_mb: 0,
            },
        }
    }

    /// Files that could not even be read from disk.
    pub fn with_read_failures(mut self, text: &[FileFailure], reference: &[FileFailure]) -> Self {
        self.inner.text_files_failed.extend_from_slice(text);
        self.inner.reference_files_failed.extend_from_slice(reference);
        self
    }

    pub fn with_text(mut self, load: &TextLoad) -> Self {
        self.inner.text_files_loaded = load.loaded.clone();
        self.inner
            .text_files_failed
            .extend(load.failures.iter().map(|e| FileFailure {
                file: e.file().to_string(),
                reason: e.reason(),
            }));
        self.inner.extracted_names = load.candidates.len();
        self.inner.names_with_marker = load.present_count();
        self
    }

    pub fn with_reference(mut self, load: &ReferenceLoad) -> Self {
        self.inner.reference_files_loaded = load.loaded.clone();
        self.inner
            .reference_files_failed
            .extend(load.failures.iter().map(|e| FileFailure {
                file: e.file().to_string(),
                reason: e.reason(),
            }));
        self.inner.reference_rows = load.table.len();
        self
    }

    /// Recorded for every run, including ones that never classify.
    pub fn with_policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.inner.unmatched_policy = policy;
        self
    }

    pub fn with_classification(mut self, res: &ClassificationResult) -> Self {
        self.inner.matched_rows = res.matched_rows;
        self.inner.duplicate_rows = res.duplicate.len();
        self.inner.unique_rows = res.unique_count();
        self.inner.mismatched_rows = res.length_mismatched.len();
        self.inner.matched_unique_rows = res.matched_unique.len();
        self.inner.unmatched_names = res.unmatched.len();
        self.inner.issuance_rows = res.issuance.len();
        self.inner.issuance_date_failures = res.issuance_failures.len();
        self
    }

    pub fn with_memory(mut self, start: MemorySample, end: MemorySample) -> Self {
        self.inner.mem_used_start_mb = start.used_mb;
        self.inner.mem_used_end_mb = end.used_mb;
        self
    }

    pub fn build(mut self, status: &str, ended_utc: DateTime<Utc>) -> RunSummary {
        self.inner.status = status.to_string();
        self.inner.ended_utc = ended_utc;
        self.inner.duration_secs =
            (ended_utc - self.inner.started_utc).num_milliseconds() as f64 / 1000.0;
        self.inner
    }
}
