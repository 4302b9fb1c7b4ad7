use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuakemapError {
    /// Row 0 refers to the header (a required column is missing).
    #[error("Malformed record at row {row}: field `{field}` {reason}")]
    MalformedRecord {
        row: usize,
        field: String,
        reason: String,
    },

    #[error("Classification of `{column}` at row {row} produced label {label}, expected 4..=10")]
    ClassificationRange {
        row: usize,
        column: &'static str,
        label: i64,
    },

    #[error("Casualty index {index} at row {row} is outside the style ramp (0..=4)")]
    StyleIndexOutOfRange { row: usize, index: i64 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl QuakemapError {
    pub fn malformed(row: usize, field: &str, reason: impl Into<String>) -> Self {
        QuakemapError::MalformedRecord {
            row,
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuakemapError>;
