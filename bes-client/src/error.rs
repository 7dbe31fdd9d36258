//! Error types for the BES clients

use reqwest::header::HeaderMap;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the batch service or the blob store
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Service returned a non-success status code
    #[error("The request failed with status code: {status}")]
    ApiError {
        /// HTTP status code
        status: reqwest::StatusCode,
        /// Response headers, which carry the request id and timestamp
        headers: HeaderMap,
        /// Raw response body
        body: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Storage connection string could not be used
    #[error("Invalid storage credential: {0}")]
    InvalidCredential(String),

    /// Local file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Create an API error from a failed response's parts
    pub fn api_error(
        status: reqwest::StatusCode,
        headers: HeaderMap,
        body: impl Into<String>,
    ) -> Self {
        Self::ApiError {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Status code of an API error
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status(),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(reqwest::StatusCode::NOT_FOUND)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if status.is_client_error())
    }

    /// Headers of an API error as `name: value` lines
    pub fn render_headers(&self) -> String {
        match self {
            Self::ApiError { headers, .. } => headers
                .iter()
                .map(|(name, value)| {
                    format!("{}: {}", name, String::from_utf8_lossy(value.as_bytes()))
                })
                .collect::<Vec<_>>()
                .join("\n"),
            _ => String::new(),
        }
    }
}
