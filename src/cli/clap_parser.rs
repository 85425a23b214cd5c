use crate::config::AppConfig;
use crate::error::ConfigError;
use crate::matching::UnmatchedPolicy;
use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(
    name = "name_reconcile",
    version,
    about = "Reconcile names extracted from transaction logs against card holder tables",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Transaction log text file(s), in order (env: NAME_RECONCILE_TEXT)
    #[arg(
        long = "text",
        value_name = "FILE",
        env = "NAME_RECONCILE_TEXT",
        value_delimiter = ','
    )]
    pub text: Vec<String>,
    /// HTML reference table file(s), in order (env: NAME_RECONCILE_REFERENCE)
    #[arg(
        long = "reference",
        value_name = "FILE",
        env = "NAME_RECONCILE_REFERENCE",
        value_delimiter = ','
    )]
    pub reference: Vec<String>,
    /// Directory for result files (env: NAME_RECONCILE_OUT_DIR)
    #[arg(long = "out-dir", value_name = "DIR", env = "NAME_RECONCILE_OUT_DIR")]
    pub out_dir: Option<String>,
    /// Token that precedes a name in the log (env: NAME_RECONCILE_MARKER, default NPR)
    #[arg(long = "marker", value_name = "TOKEN", env = "NAME_RECONCILE_MARKER")]
    pub marker: Option<String>,
    /// What to do with extracted names that have no reference row
    #[arg(long = "unmatched", value_name = "POLICY", env = "NAME_RECONCILE_UNMATCHED")]
    pub unmatched: Option<UnmatchedPolicy>,
    /// JSON config file; flags override its values
    #[arg(long = "config", value_name = "FILE", env = "NAME_RECONCILE_CONFIG")]
    pub config: Option<String>,
    /// Skip writing run_summary.csv
    #[arg(long = "no-summary")]
    pub no_summary: bool,
    /// Write a .env template to PATH and exit
    #[arg(long = "write-env-template", value_name = "PATH")]
    pub write_env_template: Option<String>,
}

impl Cli {
    pub fn to_app_config(&self) -> Result<AppConfig, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };
        if !self.text.is_empty() {
            cfg.input.text_files = self.text.clone();
        }
        if !self.reference.is_empty() {
            cfg.input.reference_files = self.reference.clone();
        }
        if let Some(dir) = &self.out_dir {
            cfg.export.out_dir = dir.clone();
        }
        if let Some(marker) = &self.marker {
            cfg.matching.marker = marker.clone();
        }
        if let Some(policy) = self.unmatched {
            cfg.matching.unmatched_policy = policy;
        }
        if self.no_summary {
            cfg.export.write_summary = false;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}
