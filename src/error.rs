//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Push-stream (SSE) errors.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Not connected")]
    NotConnected,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Unexpected status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

/// Session lifecycle and trade errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No game is running")]
    NotRunning,

    #[error("A game is already running")]
    AlreadyRunning,

    #[error("A game is already starting")]
    StartPending,

    #[error("Invalid holdings in trade response: {0}")]
    InvalidHoldings(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_errors_convert_to_sdk_error() {
        let err: SdkError = SessionError::NotRunning.into();
        assert!(matches!(err, SdkError::Session(SessionError::NotRunning)));

        let err: SdkError = StreamError::NotConnected.into();
        assert_eq!(err.to_string(), "Stream error: Not connected");

        let err: SdkError = HttpError::ServerError {
            status: 500,
            body: "boom".into(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP error: Server error 500: boom");
    }
}
