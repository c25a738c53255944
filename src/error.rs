//! Error taxonomy for the scorecard pipeline.
//!
//! Every variant is terminal for a single pipeline run: no partial result is
//! produced and nothing is retried internally. Malformed rows are not errors;
//! the normalizer drops them.

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, ScorecardError>;

#[derive(Debug, Error)]
pub enum ScorecardError {
    /// The source could not be retrieved (network failure, non-success
    /// status, unreadable local file).
    #[error("Failed to fetch data: {0}")]
    Fetch(String),

    /// The bytes could not be read as a workbook or delimited table.
    #[error("Failed to parse data: {0}")]
    Parse(String),

    /// No row survived normalization.
    #[error("No valid rows found in dataset.")]
    EmptyDataset,

    /// A required setting (the source location) is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ScorecardError {
    pub fn fetch(msg: impl Into<String>) -> Self {
        ScorecardError::Fetch(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ScorecardError::Parse(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        ScorecardError::Configuration(msg.into())
    }
}
