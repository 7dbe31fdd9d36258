//! Blob store endpoints

use std::path::Path;

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use tracing::{debug, info};
use uuid::Uuid;

use crate::credential::{STORAGE_VERSION, StorageCredential};
use crate::error::{ClientError, Result};
use crate::handle_empty_response;

/// HTTP client for the blob store
///
/// Only the two operations a batch run needs are provided: creating a
/// container and uploading a file as a block blob.
#[derive(Debug, Clone)]
pub struct BlobClient {
    credential: StorageCredential,
    client: Client,
}

impl BlobClient {
    /// Create a blob client from a parsed credential
    pub fn new(credential: StorageCredential) -> Self {
        Self::with_client(credential, Client::new())
    }

    /// Create a blob client from a storage connection string
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        Ok(Self::new(StorageCredential::from_connection_string(
            connection_string,
        )?))
    }

    /// Create a blob client with a custom HTTP client
    pub fn with_client(credential: StorageCredential, client: Client) -> Self {
        Self { credential, client }
    }

    // =============================================================================
    // Containers
    // =============================================================================

    /// Create a container unless it already exists
    pub async fn ensure_container(&self, container: &str) -> Result<()> {
        let mut url = self.url_for(&[container])?;
        url.query_pairs_mut().append_pair("restype", "container");

        let response = self.send(Method::PUT, url, None).await?;
        if response.status() == StatusCode::CONFLICT {
            debug!("Container {} already exists", container);
            return Ok(());
        }

        handle_empty_response(response).await
    }

    // =============================================================================
    // Blobs
    // =============================================================================

    /// Upload a local file as a block blob, replacing any existing blob
    ///
    /// Slashes in `blob` become virtual directories.
    pub async fn upload_file(&self, path: &Path, container: &str, blob: &str) -> Result<()> {
        let content = tokio::fs::read(path).await?;
        info!(
            "Uploading {} ({} bytes) to {}/{}",
            path.display(),
            content.len(),
            container,
            blob
        );

        let mut segments = vec![container];
        segments.extend(blob.split('/').filter(|s| !s.is_empty()));
        let url = self.url_for(&segments)?;

        let response = self.send(Method::PUT, url, Some(content)).await?;
        handle_empty_response(response).await
    }

    /// Build a URL below the blob endpoint from unescaped path segments
    pub fn url_for(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.credential.blob_endpoint().clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidCredential("blob endpoint cannot be a base URL".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::Response> {
        let request_id = Uuid::new_v4().to_string();
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        let length = body.as_ref().map_or(0, Vec::len);

        let mut builder = self
            .client
            .request(method.clone(), url.clone())
            .header("x-ms-date", date)
            .header("x-ms-version", STORAGE_VERSION)
            .header("x-ms-client-request-id", &request_id)
            .header(CONTENT_LENGTH, length);
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/octet-stream"))
                .header("x-ms-blob-type", "BlockBlob")
                .body(body);
        }

        let mut request = builder.build()?;
        self.credential.authorize(&mut request)?;

        debug!("{} {} (client request id {})", method, url, request_id);
        Ok(self.client.execute(request).await?)
    }
}
