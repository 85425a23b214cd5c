use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("cannot read config file {path}: {reason}")]
    Load { path: String, reason: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{file}: not valid UTF-8 text: {source}")]
    Decode {
        file: String,
        #[source]
        source: std::str::Utf8Error,
    },
}

impl ExtractError {
    pub fn file(&self) -> &str {
        match self {
            Self::Decode { file, .. } => file,
        }
    }

    /// The message without the file prefix.
    pub fn reason(&self) -> String {
        match self {
            Self::Decode { source, .. } => format!("not valid UTF-8 text: {source}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("{file}: not valid UTF-8 text: {source}")]
    Decode {
        file: String,
        #[source]
        source: std::str::Utf8Error,
    },
    #[error("{file}: {reason}")]
    Parse { file: String, reason: String },
}

impl ReferenceError {
    pub fn file(&self) -> &str {
        match self {
            Self::Decode { file, .. } | Self::Parse { file, .. } => file,
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Self::Decode { source, .. } => format!("not valid UTF-8 text: {source}"),
            Self::Parse { reason, .. } => reason.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateComputationError {
    #[error("expiry date is missing")]
    Missing,
    #[error("unrecognised expiry date: {0:?}")]
    Unparseable(String),
    #[error("issue date out of range for expiry {0}")]
    OutOfRange(String),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),
    #[error("xlsx export error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
