// src/utils/error.rs
use thiserror::Error;

// Fetching the page is the only fatal step of a run; everything the
// extractor cannot find is reported as an empty field instead.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error: {0}")]
    Http(reqwest::StatusCode),

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("Request blocked by the server (403 Forbidden)")]
    Blocked,

    #[error("Page not found: {0}")]
    NotFound(String),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Fetching the page failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_converts_into_app_error() {
        let err: AppError = FetchError::NotFound("https://example.com/x".to_string()).into();
        assert!(matches!(err, AppError::Fetch(FetchError::NotFound(_))));
        assert_eq!(
            err.to_string(),
            "Fetching the page failed: Page not found: https://example.com/x"
        );
    }

    #[test]
    fn test_status_is_rendered_in_http_error() {
        let err = FetchError::Http(reqwest::StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "HTTP error: 502 Bad Gateway");
    }
}
