//! Batch job API endpoints

use bes_core::domain::job::JobStatus;
use bes_core::dto::job::ExecutionRequest;
use tracing::debug;

use crate::error::Result;
use crate::{API_VERSION, BatchClient, handle_empty_response, handle_response};

impl BatchClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a new job
    ///
    /// The job is created but not started.
    ///
    /// # Returns
    /// The job identifier issued by the service
    ///
    /// # Example
    /// ```no_run
    /// # use bes_client::BatchClient;
    /// # use bes_core::domain::blob::BlobReference;
    /// # use bes_core::dto::job::ExecutionRequest;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = BatchClient::new("http://localhost:8080/jobs", "key");
    /// let request = ExecutionRequest::new()
    ///     .with_input("input1", BlobReference::account("AccountName=a;AccountKey=k", "c/in.csv"));
    /// let job_id = client.submit_job(&request).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_job(&self, request: &ExecutionRequest) -> Result<String> {
        debug!("POST {}", self.base_url);
        let response = self
            .client
            .post(&self.base_url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Start a submitted job
    ///
    /// # Arguments
    /// * `job_id` - The job identifier returned by [`BatchClient::submit_job`]
    pub async fn start_job(&self, job_id: &str) -> Result<()> {
        let url = self.endpoint_url(&[job_id, "start"])?;
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Get the current status of a job
    ///
    /// # Returns
    /// The status code plus results or error details, depending on the state
    pub async fn get_job_status(&self, job_id: &str) -> Result<JobStatus> {
        let url = self.job_url(job_id)?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        handle_response(response).await
    }

    /// Delete a job, cancelling it if it is still running
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        let url = self.job_url(job_id)?;
        debug!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .query(&[("api-version", API_VERSION)])
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        handle_empty_response(response).await
    }
}
