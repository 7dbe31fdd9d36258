//! Batch service
//!
//! Job lifecycle calls against the Batch Execution Service.

use async_trait::async_trait;
use bes_client::{BatchClient, Result};
use bes_core::domain::job::JobStatus;
use bes_core::dto::job::ExecutionRequest;

/// Service trait for the batch job lifecycle
#[async_trait]
pub trait BatchService: Send + Sync {
    /// Submits a job and returns its identifier
    async fn submit_job(&self, request: &ExecutionRequest) -> Result<String>;

    /// Starts a submitted job
    async fn start_job(&self, job_id: &str) -> Result<()>;

    /// Fetches the current status of a job
    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus>;

    /// Deletes a job, cancelling it if it is still running
    async fn delete_job(&self, job_id: &str) -> Result<()>;
}

#[async_trait]
impl BatchService for BatchClient {
    async fn submit_job(&self, request: &ExecutionRequest) -> Result<String> {
        BatchClient::submit_job(self, request).await
    }

    async fn start_job(&self, job_id: &str) -> Result<()> {
        BatchClient::start_job(self, job_id).await
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatus> {
        BatchClient::get_job_status(self, job_id).await
    }

    async fn delete_job(&self, job_id: &str) -> Result<()> {
        BatchClient::delete_job(self, job_id).await
    }
}
