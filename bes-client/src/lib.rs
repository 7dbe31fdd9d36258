//! BES HTTP Clients
//!
//! Type-safe HTTP clients for the two services a batch run talks to:
//! - [`BatchClient`] for the Batch Execution Service REST API (submit, start,
//!   status, delete)
//! - [`BlobClient`] for the blob store holding job inputs and outputs
//!
//! # Example
//!
//! ```no_run
//! use bes_client::BatchClient;
//! use bes_core::dto::job::ExecutionRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BatchClient::new("https://example.net/workspaces/w/services/s/jobs", "key");
//!
//!     let job_id = client.submit_job(&ExecutionRequest::new()).await?;
//!     client.start_job(&job_id).await?;
//!
//!     println!("Started job: {}", job_id);
//!     Ok(())
//! }
//! ```

mod blobs;
pub mod credential;
pub mod error;
mod jobs;

// Re-export commonly used types
pub use blobs::BlobClient;
pub use credential::StorageCredential;
pub use error::{ClientError, Result};

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

/// API version appended to every batch service call
pub const API_VERSION: &str = "2.0";

/// HTTP client for the Batch Execution Service
///
/// Every request carries the API key as a bearer token and the
/// `api-version` query parameter.
#[derive(Debug, Clone)]
pub struct BatchClient {
    /// Jobs endpoint of the web service (e.g., ".../services/<id>/jobs")
    base_url: String,
    /// API key of the web service
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl BatchClient {
    /// Create a new batch client
    ///
    /// # Arguments
    /// * `base_url` - The jobs endpoint of the web service
    /// * `api_key` - The web service API key
    ///
    /// # Example
    /// ```
    /// use bes_client::BatchClient;
    ///
    /// let client = BatchClient::new("http://localhost:8080/jobs", "key");
    /// ```
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a new batch client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the jobs endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of a single job resource
    ///
    /// The job id is treated as one opaque path segment and percent-encoded.
    pub fn job_url(&self, job_id: &str) -> Result<Url> {
        self.endpoint_url(&[job_id])
    }

    /// Build a URL below the jobs endpoint from unescaped path segments
    pub(crate) fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::ParseError(format!("Invalid jobs endpoint '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::ParseError(format!(
                    "Jobs endpoint '{}' cannot be a base URL",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

// =============================================================================
// Response Handlers
// =============================================================================

/// Check the status code and deserialize the JSON body
///
/// A failed response keeps its status, headers and body for diagnostics.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Check the status code of a response whose body is not needed
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    check_status(response).await.map(|_| ())
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ClientError::api_error(status, headers, body))
}
