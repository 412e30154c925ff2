//! Error types for condition lookups.

use thiserror::Error;

/// Errors a condition provider can report.
///
/// Planning stages never propagate these; a failed lookup counts as
/// "no data" for that point or tick.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Request timeout
    #[error("request timeout after {0}s")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Non-success HTTP status
    #[error("HTTP error: {0}")]
    HttpError(u16),

    /// Malformed payload or record
    #[error("invalid data: {0}")]
    ParseError(String),

    /// Local data file could not be read
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ProviderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for ProviderError {
    fn from(e: csv::Error) -> Self {
        Self::ParseError(e.to_string())
    }
}
