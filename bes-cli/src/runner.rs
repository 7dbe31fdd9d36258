//! Job runner
//!
//! Drives one batch run from start to finish: stage the input blob, submit
//! and start the job, then poll until the job reaches a terminal status or
//! the polling budget runs out. Every call is awaited in turn, so at most one
//! request is in flight.

use std::sync::Arc;
use std::time::Duration;

use bes_core::domain::blob::BlobMap;
use bes_core::domain::job::{JobStatus, StatusCode};
use bes_core::dto::job::ExecutionRequest;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::RunError;
use crate::service::{BatchService, BlobService};

/// Outputs of a finished job
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job_id: String,
    pub results: BlobMap,
}

/// Last status seen by the polling loop
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub status: JobStatus,
    /// Set when the budget ran out and the job was deleted
    pub timed_out: bool,
    pub elapsed: Duration,
}

/// Runs a single batch job end to end
pub struct JobRunner {
    config: Config,
    batch: Arc<dyn BatchService>,
    blobs: Arc<dyn BlobService>,
}

impl JobRunner {
    pub fn new(config: Config, batch: Arc<dyn BatchService>, blobs: Arc<dyn BlobService>) -> Self {
        Self {
            config,
            batch,
            blobs,
        }
    }

    /// Runs the whole sequence
    ///
    /// # Returns
    /// The job's outputs if it finished; any other ending is an error
    pub async fn run(&self) -> Result<JobOutcome, RunError> {
        self.upload_input().await?;

        let request = self.config.build_request();
        let job_id = self.submit_job(&request).await?;
        self.start_job(&job_id).await?;

        let poll = self.poll_until_terminal(&job_id).await?;
        conclude(job_id, poll, &request)
    }

    /// Uploads the local input file to the configured container
    ///
    /// Fails with [`RunError::LocalFileNotFound`] before touching the network
    /// if the file does not exist.
    pub async fn upload_input(&self) -> Result<(), RunError> {
        let path = &self.config.local_input_path;
        let is_file = tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            return Err(RunError::LocalFileNotFound(path.clone()));
        }

        info!("Uploading the input to blob storage...");
        self.blobs
            .ensure_container(&self.config.container_name)
            .await?;
        self.blobs
            .upload_file(
                path,
                &self.config.container_name,
                &self.config.remote_blob_name,
            )
            .await?;

        Ok(())
    }

    /// Submits the job and returns its identifier
    pub async fn submit_job(&self, request: &ExecutionRequest) -> Result<String, RunError> {
        info!("Submitting the job...");
        let job_id = self.batch.submit_job(request).await?;
        info!("Job ID: {}", job_id);
        Ok(job_id)
    }

    pub async fn start_job(&self, job_id: &str) -> Result<(), RunError> {
        info!("Starting the job...");
        self.batch.start_job(job_id).await?;
        Ok(())
    }

    /// Polls the job at a fixed interval until it is terminal or times out
    ///
    /// The timeout is checked after each status arrives and before it is
    /// inspected. When it has passed, the job is deleted and the loop ends
    /// after this iteration, whatever the status was.
    pub async fn poll_until_terminal(&self, job_id: &str) -> Result<PollOutcome, RunError> {
        let watch = Instant::now();

        loop {
            debug!("Checking the job status...");
            let status = self.batch.get_job_status(job_id).await?;

            let timed_out = watch.elapsed() > self.config.timeout;
            if timed_out {
                warn!("Timed out. Deleting job {} ...", job_id);
                if let Err(e) = self.batch.delete_job(job_id).await {
                    warn!("Failed to delete job {}: {}", job_id, e);
                }
            }

            match status.status_code {
                StatusCode::NotStarted => info!("Job {} not yet started...", job_id),
                StatusCode::Running => info!("Job {} running...", job_id),
                StatusCode::Failed => error!("Job {} failed!", job_id),
                StatusCode::Cancelled => warn!("Job {} cancelled!", job_id),
                StatusCode::Finished => info!("Job {} finished!", job_id),
            }

            if timed_out || status.status_code.is_terminal() {
                return Ok(PollOutcome {
                    status,
                    timed_out,
                    elapsed: watch.elapsed(),
                });
            }

            sleep(self.config.poll_interval).await;
        }
    }
}

/// Maps the final status to the run result
fn conclude(
    job_id: String,
    poll: PollOutcome,
    request: &ExecutionRequest,
) -> Result<JobOutcome, RunError> {
    let PollOutcome {
        status,
        timed_out,
        elapsed,
    } = poll;

    match status.status_code {
        StatusCode::Finished => {
            if timed_out {
                warn!("Job {} finished after the timeout; results are still reported", job_id);
            }
            let results = status.results.unwrap_or_default();
            for name in request.outputs.keys() {
                if !results.contains_key(name) {
                    warn!("Declared output '{}' is missing from the job results", name);
                }
            }
            Ok(JobOutcome { job_id, results })
        }
        StatusCode::Failed => Err(RunError::RemoteJobFailed {
            job_id,
            details: status.details.unwrap_or_default(),
        }),
        StatusCode::Cancelled => Err(RunError::RemoteJobCancelled { job_id }),
        StatusCode::NotStarted | StatusCode::Running => Err(RunError::Timeout { job_id, elapsed }),
    }
}
