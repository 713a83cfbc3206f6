use thiserror::Error;

/// Failure to acquire a page's HTML
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP status {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Browser error: {0}")]
    Browser(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

/// Failure talking to the remote content API
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(err: reqwest::Error) -> Self {
        UploadError::Network(err.to_string())
    }
}
