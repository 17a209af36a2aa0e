//! Error types for the wallet profiler

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the wallet profiler
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    // Normalization errors
    #[error("Invalid transaction timestamp: {0}")]
    InvalidTimestamp(String),

    // Ledger API errors
    #[error("Ledger request failed: {0}")]
    Ledger(String),

    #[error("Ledger API error {status}: {body}")]
    LedgerStatus { status: u16, body: String },

    #[error("Ledger request timed out after {0}ms")]
    LedgerTimeout(u64),

    // Language model errors
    #[error("LLM request failed: {0}")]
    Llm(String),

    #[error("LLM API error {status}: {body}")]
    LlmStatus { status: u16, body: String },

    #[error("LLM returned no content")]
    LlmEmptyResponse,

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Longest response body kept in a status error
pub const MAX_ERROR_BODY_CHARS: usize = 512;

impl Error {
    /// Check if this error is retryable (transient)
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Ledger(_) | Error::LedgerTimeout(_) | Error::Llm(_) => true,
            Error::LedgerStatus { status, .. } | Error::LlmStatus { status, .. } => {
                *status == 429 || *status >= 500
            }
            _ => false,
        }
    }
}

/// Trim an error response body to [`MAX_ERROR_BODY_CHARS`]
pub fn body_excerpt(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
