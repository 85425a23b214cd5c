//! Join extracted names to reference records and classify the joined rows.
//!
//! The join is an exact equi-join on [`MatchKey`]: candidates drive, every
//! reference record sharing the key produces one joined row. Joined rows are
//! then split three ways:
//!
//! - **duplicate**: the (extracted name, account) pair occurs more than once;
//! - **length mismatched**: unique, but the reference name and the extracted
//!   name differ in character count;
//! - **matched unique**: unique and the same length.
//!
//! Length-mismatched rows also feed the new-card issuance projection.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::DateComputationError;
use crate::models::{
    ColumnMapping, IssuanceRecord, JoinedRow, MatchKey, NameCandidate, ReferenceTable,
    UnmatchedName,
};
use crate::normalize::key_for;

pub mod expiry;

/// What happens to present candidates that no reference record matched.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Leave them out of every output.
    #[default]
    Drop,
    /// Collect them into a separate unmatched list.
    Report,
}

impl UnmatchedPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Report => "report",
        }
    }
}

impl std::fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub columns: ColumnMapping,
    pub unmatched: UnmatchedPolicy,
}

/// A length-mismatched row that could not become an issuance record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceFailure {
    pub row: JoinedRow,
    pub error: DateComputationError,
}

#[derive(Debug, Clone, Default)]
pub struct ClassificationResult {
    /// Joined rows that found a reference, before splitting.
    pub matched_rows: usize,
    pub duplicate: Vec<JoinedRow>,
    pub length_mismatched: Vec<JoinedRow>,
    pub matched_unique: Vec<JoinedRow>,
    /// Empty unless the policy is [`UnmatchedPolicy::Report`].
    pub unmatched: Vec<UnmatchedName>,
    pub issuance: Vec<IssuanceRecord>,
    pub issuance_failures: Vec<IssuanceFailure>,
}

impl ClassificationResult {
    pub fn unique_count(&self) -> usize {
        self.length_mismatched.len() + self.matched_unique.len()
    }
}

/// Left join of candidates onto reference records. Returns the rows that
/// found a reference, in candidate order then reference order, plus every
/// present candidate that found none.
pub fn join_candidates(
    candidates: &[NameCandidate],
    references: &ReferenceTable,
    columns: &ColumnMapping,
) -> (Vec<JoinedRow>, Vec<UnmatchedName>) {
    // Records without a name can never survive the join, so they stay out of the index.
    let mut index: HashMap<MatchKey, Vec<usize>> = HashMap::new();
    for (j, r) in references.records.iter().enumerate() {
        if let Some(name) = r.name(columns) {
            index.entry(key_for(Some(name))).or_default().push(j);
        }
    }
    debug!("reference index: {} distinct keys", index.len());

    let mut joined = Vec::new();
    let mut unmatched = Vec::new();
    for c in candidates {
        let key = key_for(c.raw.as_deref());
        match index.get(&key) {
            Some(hits) if !c.is_absent() => {
                joined.extend(hits.iter().map(|&j| JoinedRow {
                    candidate: c.clone(),
                    reference: references.records[j].clone(),
                }));
            }
            _ if !c.is_absent() => unmatched.push(UnmatchedName {
                candidate: c.clone(),
                key,
            }),
            _ => {}
        }
    }
    (joined, unmatched)
}

/// Split rows into (duplicate, unique) on the (extracted name, account) pair.
/// Every member of a repeated pair is a duplicate.
pub fn split_duplicates(
    rows: Vec<JoinedRow>,
    columns: &ColumnMapping,
) -> (Vec<JoinedRow>, Vec<JoinedRow>) {
    let mut counts: HashMap<(String, Option<String>), usize> = HashMap::new();
    for r in &rows {
        *counts.entry(pair_key(r, columns)).or_default() += 1;
    }
    rows.into_iter()
        .partition(|r| counts.get(&pair_key(r, columns)).copied().unwrap_or(0) > 1)
}

fn pair_key(row: &JoinedRow, columns: &ColumnMapping) -> (String, Option<String>) {
    (
        row.extracted_name().to_string(),
        row.reference.account(columns).map(str::to_string),
    )
}

/// True when the reference name and the extracted name have the same number
/// of characters. Missing values count as empty.
pub fn lengths_agree(row: &JoinedRow, columns: &ColumnMapping) -> bool {
    let reference = row.reference.name(columns).unwrap_or("");
    reference.chars().count() == row.extracted_name().chars().count()
}

/// Split unique rows into (length mismatched, matched unique).
pub fn split_by_length(
    unique: Vec<JoinedRow>,
    columns: &ColumnMapping,
) -> (Vec<JoinedRow>, Vec<JoinedRow>) {
    unique
        .into_iter()
        .partition(|r| !lengths_agree(r, columns))
}

pub fn issuance_record(
    row: &JoinedRow,
    columns: &ColumnMapping,
) -> Result<IssuanceRecord, DateComputationError> {
    let r = &row.reference;
    let (issue_date, expiry_date) = expiry::issuance_dates(r.expiry(columns))?;
    Ok(IssuanceRecord {
        iss_type: IssuanceRecord::ISS_TYPE_NEW.to_string(),
        card_number: r.pan(columns).unwrap_or("").to_string(),
        cardholder_name: row.extracted_name().to_string(),
        account: r.account(columns).unwrap_or("").to_string(),
        issue_date,
        expiry_date,
        card_id: r.card_code(columns).unwrap_or("").to_string(),
    })
}

/// Issuance records for every row whose expiry can be used; the rest come
/// back as failures and are logged once in aggregate.
pub fn build_issuance(
    rows: &[JoinedRow],
    columns: &ColumnMapping,
) -> (Vec<IssuanceRecord>, Vec<IssuanceFailure>) {
    let mut records = Vec::with_capacity(rows.len());
    let mut failures = Vec::new();
    for row in rows {
        match issuance_record(row, columns) {
            Ok(rec) => records.push(rec),
            Err(error) => failures.push(IssuanceFailure {
                row: row.clone(),
                error,
            }),
        }
    }
    if !failures.is_empty() {
        warn!(
            "{} of {} mismatched rows left out of the issuance output: expiry date missing or unreadable",
            failures.len(),
            rows.len()
        );
    }
    (records, failures)
}

pub fn classify(
    candidates: &[NameCandidate],
    references: &ReferenceTable,
    opts: &MatchOptions,
) -> ClassificationResult {
    let cols = &opts.columns;
    let (joined, unmatched) = join_candidates(candidates, references, cols);
    let matched_rows = joined.len();
    let (duplicate, unique) = split_duplicates(joined, cols);
    let (length_mismatched, matched_unique) = split_by_length(unique, cols);
    let (issuance, issuance_failures) = build_issuance(&length_mismatched, cols);

    let unmatched = match opts.unmatched {
        UnmatchedPolicy::Drop => {
            if !unmatched.is_empty() {
                debug!("dropping {} unmatched names", unmatched.len());
            }
            Vec::new()
        }
        UnmatchedPolicy::Report => unmatched,
    };

    info!(
        "Matched rows: {} (duplicate {}, mismatched length {}, matched unique {}); issuance rows {}",
        matched_rows,
        duplicate.len(),
        length_mismatched.len(),
        matched_unique.len(),
        issuance.len()
    );

    ClassificationResult {
        matched_rows,
        duplicate,
        length_mismatched,
        matched_unique,
        unmatched,
        issuance,
        issuance_failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReferenceRecord;

    fn rec(name: &str, account: &str, pan: &str, expiry: &str) -> ReferenceRecord {
        let mut r = ReferenceRecord::default();
        for (k, v) in [
            ("E_NAME", name),
            ("ACCOUNT", account),
            ("PAN", pan),
            ("CAR_CODE", "01"),
            ("EXPIRYDATE", expiry),
        ] {
            if !v.is_empty() {
                r.fields.insert(k.to_string(), v.to_string());
            }
        }
        r
    }

    fn table(records: Vec<ReferenceRecord>) -> ReferenceTable {
        ReferenceTable {
            columns: ["E_NAME", "ACCOUNT", "PAN", "CAR_CODE", "EXPIRYDATE"]
                .map(String::from)
                .to_vec(),
            records,
        }
    }

    fn cands(names: &[Option<&str>]) -> Vec<NameCandidate> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| NameCandidate {
                index: i,
                raw: n.map(str::to_string),
            })
            .collect()
    }

    fn names(rows: &[JoinedRow]) -> Vec<&str> {
        rows.iter().map(|r| r.extracted_name()).collect()
    }

    #[test]
    fn end_to_end_scenario() {
        let c = cands(&[Some("JOHN SMITH"), None, Some("MARY A JONES")]);
        let t = table(vec![
            rec("JOHN SMITH", "A1", "4111", "2025-06-15"),
            rec("MARY A JONES", "A2", "4222", "2026-01-31"),
        ]);
        let res = classify(&c, &t, &MatchOptions::default());
        assert_eq!(res.matched_rows, 2);
        assert!(res.duplicate.is_empty());
        assert_eq!(names(&res.matched_unique), vec!["JOHN SMITH", "MARY A JONES"]);
        assert!(res.length_mismatched.is_empty());
        assert!(res.issuance.is_empty());
    }

    #[test]
    fn extra_space_in_reference_is_a_length_mismatch() {
        let c = cands(&[Some("JOHN SMITH")]);
        let t = table(vec![rec("JOHN  SMITH", "A1", "4111", "2025-06-15")]);
        let res = classify(&c, &t, &MatchOptions::default());
        assert_eq!(res.length_mismatched.len(), 1);
        assert!(res.matched_unique.is_empty());

        let iss = &res.issuance[0];
        assert_eq!(iss.iss_type, "NEW");
        assert_eq!(iss.card_number, "4111");
        assert_eq!(iss.cardholder_name, "JOHN SMITH");
        assert_eq!(iss.account, "A1");
        assert_eq!(iss.issue_date, "2021-06-16");
        assert_eq!(iss.expiry_date, "2025-06-15");
        assert_eq!(iss.card_id, "01");
    }

    #[test]
    fn duplicates_are_symmetric() {
        // The same name on two lines, one account: both rows are duplicates.
        let c = cands(&[Some("ANN LEE"), Some("BOB RAY"), Some("ANN LEE")]);
        let t = table(vec![
            rec("ANN LEE", "A1", "1", "2025-01-01"),
            rec("BOB RAY", "B1", "2", "2025-01-01"),
        ]);
        let res = classify(&c, &t, &MatchOptions::default());
        assert_eq!(names(&res.duplicate), vec!["ANN LEE", "ANN LEE"]);
        assert_eq!(names(&res.matched_unique), vec!["BOB RAY"]);
    }

    #[test]
    fn fan_out_to_distinct_accounts_stays_unique() {
        let c = cands(&[Some("ANN LEE")]);
        let t = table(vec![
            rec("ANN LEE", "A1", "1", "2025-01-01"),
            rec("ann  lee", "A2", "2", "2025-01-01"),
        ]);
        let res = classify(&c, &t, &MatchOptions::default());
        assert_eq!(res.matched_rows, 2);
        assert!(res.duplicate.is_empty());
        assert_eq!(res.matched_unique.len(), 1);
        assert_eq!(res.length_mismatched.len(), 1);
        assert_eq!(res.length_mismatched[0].reference.get("ACCOUNT"), Some("A2"));
    }

    #[test]
    fn missing_accounts_pair_up_as_duplicates() {
        let c = cands(&[Some("ANN LEE")]);
        let t = table(vec![
            rec("ANN LEE", "", "1", "2025-01-01"),
            rec("ANN LEE", "", "2", "2025-01-01"),
        ]);
        let res = classify(&c, &t, &MatchOptions::default());
        assert_eq!(res.duplicate.len(), 2);
    }

    #[test]
    fn partitions_cover_every_joined_row_once() {
        let c = cands(&[
            Some("ANN LEE"),
            Some("ANN LEE"),
            Some("BOB RAY"),
            None,
            Some("CY DOE"),
            Some("NOBODY HERE"),
        ]);
        let t = table(vec![
            rec("ANN LEE", "A1", "1", "2025-01-01"),
            rec("BOB  RAY", "B1", "2", "2025-01-01"),
            rec("CY DOE", "C1", "3", "2025-01-01"),
            rec("CY DOE", "C2", "4", "2025-01-01"),
            rec("", "Z9", "5", "2025-01-01"),
        ]);
        let res = classify(&c, &t, &MatchOptions::default());
        let total = res.duplicate.len() + res.length_mismatched.len() + res.matched_unique.len();
        assert_eq!(total, res.matched_rows);
        assert_eq!(res.matched_rows, 5);
        let mut seen: Vec<(usize, Option<&str>)> = res
            .duplicate
            .iter()
            .chain(&res.length_mismatched)
            .chain(&res.matched_unique)
            .map(|r| (r.candidate.index, r.reference.get("ACCOUNT")))
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), total);
    }

    #[test]
    fn unmatched_policy() {
        let c = cands(&[Some("ANN LEE"), None, Some("NOBODY HERE")]);
        let t = table(vec![rec("ANN LEE", "A1", "1", "2025-01-01")]);

        let dropped = classify(&c, &t, &MatchOptions::default());
        assert!(dropped.unmatched.is_empty());

        let opts = MatchOptions {
            unmatched: UnmatchedPolicy::Report,
            ..Default::default()
        };
        let reported = classify(&c, &t, &opts);
        assert_eq!(reported.unmatched.len(), 1);
        assert_eq!(reported.unmatched[0].candidate.as_str(), "NOBODY HERE");
        assert_eq!(reported.unmatched[0].key.as_str(), "NOBODY||HERE");
        // Reporting does not change the three partitions.
        assert_eq!(reported.matched_unique, dropped.matched_unique);
    }

    #[test]
    fn bad_expiry_skips_only_that_issuance_row() {
        let c = cands(&[Some("ANN LEE"), Some("BOB RAY")]);
        let t = table(vec![
            rec("ANN  LEE", "A1", "1", "not a date"),
            rec("BOB  RAY", "B1", "2", "2024-03-01"),
        ]);
        let res = classify(&c, &t, &MatchOptions::default());
        assert_eq!(res.length_mismatched.len(), 2);
        assert_eq!(res.issuance.len(), 1);
        assert_eq!(res.issuance[0].cardholder_name, "BOB RAY");
        assert_eq!(res.issuance[0].issue_date, "2020-03-02");
        assert_eq!(res.issuance_failures.len(), 1);
        assert!(matches!(
            res.issuance_failures[0].error,
            DateComputationError::Unparseable(_)
        ));
    }

    #[test]
    fn missing_card_code_is_blank() {
        let c = cands(&[Some("ANN LEE")]);
        let mut r = rec("ANN  LEE", "A1", "1", "2025-06-15");
        r.fields.remove("CAR_CODE");
        let res = classify(&c, &table(vec![r]), &MatchOptions::default());
        assert_eq!(res.issuance[0].card_id, "");
    }

    #[test]
    fn custom_column_mapping() {
        let mut r = ReferenceRecord::default();
        r.fields.insert("HOLDER".into(), "ANN LEE".into());
        r.fields.insert("ACCT_NO".into(), "77".into());
        let t = ReferenceTable {
            columns: vec!["HOLDER".into(), "ACCT_NO".into()],
            records: vec![r],
        };
        let opts = MatchOptions {
            columns: ColumnMapping {
                name: "HOLDER".into(),
                account: "ACCT_NO".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let res = classify(&cands(&[Some("ANN LEE")]), &t, &opts);
        assert_eq!(res.matched_unique.len(), 1);
    }
}
