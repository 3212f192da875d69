use std::time::Duration;
use thiserror::Error;

/// Unified error type for local-translator-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Network operations against the Ollama server (reachability, timeouts, HTTP errors)
/// - Local validation of user actions (input length, language and model choices)
/// - Preference store operations (opening, reading, writing)
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Network Errors
    // ==========================================================================
    /// The server could not be reached (connection refused, DNS failure, reset)
    #[error("could not reach the Ollama server: {0}")]
    Unreachable(String),

    /// No response within the request budget
    #[error("{operation} timed out after {timeout:?}; the Ollama server may not be running")]
    Timeout { operation: &'static str, timeout: Duration },

    /// Non-success HTTP status, optionally carrying the server's own message
    #[error("server returned HTTP {status}{}", message.as_ref().map(|m| format!(": {m}")).unwrap_or_default())]
    ServerError { status: u16, message: Option<String> },

    /// Response body could not be decoded
    #[error("invalid response from the Ollama server: {0}")]
    InvalidResponse(String),

    /// Failed to construct the HTTP client
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    // ==========================================================================
    // Validation Errors
    // ==========================================================================
    /// Input exceeds the maximum accepted length
    #[error("input is {length} characters long; the maximum is {max}")]
    InputTooLong { length: usize, max: usize },

    /// Language code is not in the language table
    #[error("unsupported language: {0}")]
    UnknownLanguage(String),

    /// Auto-detect was requested as the target language
    #[error("auto-detect cannot be used as the target language")]
    AutoDetectTarget,

    /// Swap requested while the source language is auto-detect
    #[error("cannot swap languages while the source language is auto-detect")]
    SwapWithAutoDetect,

    /// Model is not part of the current directory listing
    #[error("model '{0}' is not installed on the server")]
    UnknownModel(String),

    // ==========================================================================
    // Preference Errors
    // ==========================================================================
    /// Failed to open the preference store
    #[error("failed to open preference store: {0}")]
    PreferenceOpen(String),

    /// Failed to read a stored preference
    #[error("failed to read preference: {0}")]
    PreferenceRead(String),

    /// Failed to write a preference
    #[error("failed to write preference: {0}")]
    PreferenceWrite(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification used by front-ends to pick wording and status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unreachable,
    Timeout,
    ServerError,
    Validation,
    Other,
}

impl Error {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unreachable(_) => ErrorKind::Unreachable,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ServerError { .. } | Self::InvalidResponse(_) => ErrorKind::ServerError,
            Self::InputTooLong { .. }
            | Self::UnknownLanguage(_)
            | Self::AutoDetectTarget
            | Self::SwapWithAutoDetect
            | Self::UnknownModel(_) => ErrorKind::Validation,
            _ => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_message() {
        let with_message = Error::ServerError {
            status: 404,
            message: Some("model 'x' not found".to_string()),
        };
        assert_eq!(with_message.to_string(), "server returned HTTP 404: model 'x' not found");

        let bare = Error::ServerError { status: 500, message: None };
        assert_eq!(bare.to_string(), "server returned HTTP 500");
    }

    #[test]
    fn test_timeout_mentions_server() {
        let err = Error::Timeout {
            operation: "fetching models",
            timeout: Duration::from_secs(10),
        };
        assert_eq!(
            err.to_string(),
            "fetching models timed out after 10s; the Ollama server may not be running"
        );
        assert_eq!(err.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::Unreachable("refused".into()).kind(), ErrorKind::Unreachable);
        assert_eq!(
            Error::InvalidResponse("eof".into()).kind(),
            ErrorKind::ServerError
        );
        assert_eq!(
            Error::InputTooLong { length: 2, max: 1 }.kind(),
            ErrorKind::Validation
        );
        assert_eq!(Error::SwapWithAutoDetect.kind(), ErrorKind::Validation);
        assert_eq!(Error::ConfigLoad("x".into()).kind(), ErrorKind::Other);
    }
}
