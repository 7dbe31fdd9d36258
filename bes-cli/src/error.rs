//! Run errors
//!
//! Every variant ends the run; none of them is retried.

use std::path::PathBuf;
use std::time::Duration;

use bes_client::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    /// Input file is missing, detected before any network call
    #[error("File {} doesn't exist on local computer.", .0.display())]
    LocalFileNotFound(PathBuf),

    /// A call to the blob store or the batch service did not succeed
    #[error(transparent)]
    RemoteRequestFailed(#[from] ClientError),

    #[error("Job {job_id} failed: {details}")]
    RemoteJobFailed { job_id: String, details: String },

    #[error("Job {job_id} cancelled")]
    RemoteJobCancelled { job_id: String },

    /// Polling exceeded the configured budget; the job was deleted
    #[error("Timed out after {elapsed:?} waiting for job {job_id}")]
    Timeout { job_id: String, elapsed: Duration },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let missing = RunError::LocalFileNotFound(PathBuf::from("newdatadata.csv"));
        assert_eq!(
            missing.to_string(),
            "File newdatadata.csv doesn't exist on local computer."
        );

        let failed = RunError::RemoteJobFailed {
            job_id: "j1".to_string(),
            details: "boom".to_string(),
        };
        assert_eq!(failed.to_string(), "Job j1 failed: boom");
    }

    #[test]
    fn test_client_errors_convert() {
        let err: RunError = ClientError::ParseError("bad json".to_string()).into();
        assert!(matches!(err, RunError::RemoteRequestFailed(_)));
    }
}
