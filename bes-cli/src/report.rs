//! Result reporting
//!
//! Prints where a finished job wrote its outputs, and diagnostics for runs
//! that did not finish.

use bes_client::ClientError;
use bes_core::domain::blob::BlobMap;
use colored::*;

use crate::error::RunError;
use crate::runner::JobOutcome;

/// Render output locations, one block per result in service order
pub fn render_results(results: &BlobMap) -> String {
    let mut out = String::new();
    for (name, location) in results {
        out.push_str(&format!(
            "The result '{}' is available at the following storage location:\n",
            name
        ));
        out.push_str(&format!(
            "BaseLocation: {}\n",
            location.base_location().unwrap_or_default()
        ));
        out.push_str(&format!(
            "RelativeLocation: {}\n",
            location.relative_location()
        ));
        out.push_str(&format!(
            "SasBlobToken: {}\n",
            location.sas_blob_token().unwrap_or_default()
        ));
        out.push('\n');
    }
    out
}

/// Print the outputs of a finished job
pub fn print_results(outcome: &JobOutcome) {
    println!("{}", format!("Job {} finished!", outcome.job_id).green().bold());
    println!();

    if outcome.results.is_empty() {
        println!("{}", "The job reported no outputs.".yellow());
        return;
    }
    print!("{}", render_results(&outcome.results));
}

/// Render diagnostics for a run that did not finish
pub fn render_failure(error: &RunError) -> String {
    match error {
        RunError::RemoteRequestFailed(err @ ClientError::ApiError { body, .. }) => {
            format!("{}\n{}\n\n{}", err, err.render_headers(), body)
        }
        RunError::RemoteRequestFailed(err) => err.to_string(),
        RunError::RemoteJobFailed { job_id, details } => {
            format!("Job {} failed!\nError details: {}", job_id, details)
        }
        RunError::RemoteJobCancelled { job_id } => format!("Job {} cancelled!", job_id),
        RunError::Timeout { job_id, elapsed } => format!(
            "Timed out after {:.1}s. Job {} was deleted.",
            elapsed.as_secs_f64(),
            job_id
        ),
        RunError::LocalFileNotFound(_) => error.to_string(),
    }
}

/// Print diagnostics for a run that did not finish
pub fn print_failure(error: &RunError) {
    let text = render_failure(error);
    match error {
        RunError::RemoteJobCancelled { .. } | RunError::Timeout { .. } => {
            println!("{}", text.yellow())
        }
        _ => println!("{}", text.red()),
    }
}
