use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type covering the different failure cases that can occur while the
/// tool ingests, reconciles, or emits report data.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors bubbled up from the CSV reader or writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Raised when parsing a JSON schema file fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when an expected column is absent after header normalization.
    #[error("missing column '{0}'")]
    MissingColumn(String),

    /// Raised when a shipment-count cell cannot be parsed as an integer
    /// after stripping the thousands separator.
    #[error("malformed count '{value}' in column {column}")]
    MalformedCount { column: String, value: String },

    /// Raised when a required lookup matches no row or cell.
    #[error("no match found: {0}")]
    NoMatchFound(String),

    /// Raised when the changed-sector filter leaves no rows to report on.
    #[error("no rows match the changed-sector filter")]
    EmptyResult,

    /// Raised when a routing-week value does not follow the expected format.
    #[error("malformed routing week '{0}'")]
    MalformedWeek(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the user declines the retry after an empty prompt entry.
    #[error("cancelled by user")]
    UserCancelled,

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
