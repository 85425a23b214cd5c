use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ingest::NameExtractor;
use crate::matching::{MatchOptions, UnmatchedPolicy};
use crate::models::ColumnMapping;

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct InputConfig {
    #[serde(default)]
    pub text_files: Vec<String>,
    #[serde(default)]
    pub reference_files: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct MatchingConfig {
    pub marker: String,
    pub unmatched_policy: UnmatchedPolicy,
    pub columns: ColumnMapping,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            marker: NameExtractor::DEFAULT_MARKER.into(),
            unmatched_policy: UnmatchedPolicy::Drop,
            columns: ColumnMapping::default(),
        }
    }
}

impl MatchingConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            columns: self.columns.clone(),
            unmatched: self.unmatched_policy,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct ExportConfig {
    pub out_dir: String,
    pub write_summary: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: ".".into(),
            write_summary: true,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn from_json_file(path: &str) -> Result<Self, ConfigError> {
        let load_err = |reason: String| ConfigError::Load {
            path: path.to_string(),
            reason,
        };
        let text = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| load_err(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matching.marker.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "matching.marker",
            });
        }
        let c = &self.matching.columns;
        for (field, value) in [
            ("matching.columns.name", &c.name),
            ("matching.columns.account", &c.account),
            ("matching.columns.pan", &c.pan),
            ("matching.columns.card_code", &c.card_code),
            ("matching.columns.expiry", &c.expiry),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField { field });
            }
        }
        if c.name == c.account {
            return Err(ConfigError::InvalidValue {
                field: "matching.columns.account",
                reason: format!("same column as the name: {}", c.name),
            });
        }
        if self.export.out_dir.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "export.out_dir",
            });
        }
        Ok(())
    }
}
