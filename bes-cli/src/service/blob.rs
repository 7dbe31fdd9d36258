//! Blob service
//!
//! Stages the job input in the blob store.

use std::path::Path;

use async_trait::async_trait;
use bes_client::{BlobClient, Result};

/// Service trait for the blob operations a run needs
#[async_trait]
pub trait BlobService: Send + Sync {
    /// Creates the container unless it already exists
    async fn ensure_container(&self, container: &str) -> Result<()>;

    /// Uploads a local file, replacing any blob of the same name
    async fn upload_file(&self, path: &Path, container: &str, blob: &str) -> Result<()>;
}

#[async_trait]
impl BlobService for BlobClient {
    async fn ensure_container(&self, container: &str) -> Result<()> {
        BlobClient::ensure_container(self, container).await
    }

    async fn upload_file(&self, path: &Path, container: &str, blob: &str) -> Result<()> {
        BlobClient::upload_file(self, path, container, blob).await
    }
}
