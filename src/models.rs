use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One uploaded file: a display name plus its raw bytes.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// A name recovered from one line of text, or `None` when the line carried no marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    /// Position in global extraction order.
    pub index: usize,
    pub raw: Option<String>,
}

impl NameCandidate {
    pub fn present(index: usize, raw: impl Into<String>) -> Self {
        Self {
            index,
            raw: Some(raw.into()),
        }
    }

    pub fn absent(index: usize) -> Self {
        Self { index, raw: None }
    }

    pub fn is_absent(&self) -> bool {
        self.raw.is_none()
    }

    pub fn as_str(&self) -> &str {
        self.raw.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NormalizedName {
    pub first: String,
    pub middle: String,
    pub surname: String,
}

impl NormalizedName {
    pub fn is_empty(&self) -> bool {
        self.first.is_empty() && self.middle.is_empty() && self.surname.is_empty()
    }

    /// Rebuild a single space-joined name from the non-empty parts.
    pub fn joined(&self) -> String {
        [&self.first, &self.middle, &self.surname]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchKey(pub String);

impl MatchKey {
    pub const DELIMITER: char = '|';

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MatchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Column mapping for HCS exports; maps reference columns to the fields the matcher needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnMapping {
    pub name: String,
    pub account: String,
    pub pan: String,
    pub card_code: String,
    pub expiry: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            name: "E_NAME".into(),
            account: "ACCOUNT".into(),
            pan: "PAN".into(),
            card_code: "CAR_CODE".into(),
            expiry: "EXPIRYDATE".into(),
        }
    }
}

/// One row of the reference table. Missing cells are absent from `fields`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceRecord {
    pub fields: HashMap<String, String>,
}

impl ReferenceRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn name(&self, m: &ColumnMapping) -> Option<&str> {
        self.get(&m.name)
    }

    pub fn account(&self, m: &ColumnMapping) -> Option<&str> {
        self.get(&m.account)
    }

    pub fn pan(&self, m: &ColumnMapping) -> Option<&str> {
        self.get(&m.pan)
    }

    pub fn card_code(&self, m: &ColumnMapping) -> Option<&str> {
        self.get(&m.card_code)
    }

    pub fn expiry(&self, m: &ColumnMapping) -> Option<&str> {
        self.get(&m.expiry)
    }
}

/// Concatenation of every successfully parsed reference input.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    /// Union of all input headers, in order of first appearance.
    pub columns: Vec<String>,
    pub records: Vec<ReferenceRecord>,
}

impl ReferenceTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn append(&mut self, other: ReferenceTable) {
        for c in other.columns {
            if !self.columns.contains(&c) {
                self.columns.push(c);
            }
        }
        self.records.extend(other.records);
    }
}

/// A candidate joined to one reference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRow {
    pub candidate: NameCandidate,
    pub reference: ReferenceRecord,
}

impl JoinedRow {
    pub fn extracted_name(&self) -> &str {
        self.candidate.as_str()
    }
}

/// Present candidate that found no reference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedName {
    pub candidate: NameCandidate,
    pub key: MatchKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuanceRecord {
    pub iss_type: String,
    pub card_number: String,
    pub cardholder_name: String,
    pub account: String,
    pub issue_date: String,
    pub expiry_date: String,
    pub card_id: String,
}

impl IssuanceRecord {
    pub const ISS_TYPE_NEW: &'static str = "NEW";
    pub const COLUMNS: [&'static str; 7] = [
        "ISSTYPE",
        "CARD_NUMBER",
        "CRDH_NAME",
        "ATM_ACCT",
        "ISS_DATE",
        "EXPIR_DATE",
        "CARD_ID",
    ];

    pub fn values(&self) -> [&str; 7] {
        [
            self.iss_type.as_str(),
            self.card_number.as_str(),
            self.cardholder_name.as_str(),
            self.account.as_str(),
            self.issue_date.as_str(),
            self.expiry_date.as_str(),
            self.card_id.as_str(),
        ]
    }
}
