//! BES CLI
//!
//! Uploads an input file to blob storage, runs a Batch Execution Service job
//! against it, and prints where the job wrote its outputs.

mod config;
mod error;
mod report;
mod runner;
mod service;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use bes_client::{BatchClient, BlobClient};
use clap::Parser;
use indexmap::IndexMap;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::runner::JobRunner;

#[derive(Parser)]
#[command(name = "bes")]
#[command(about = "Run a Batch Execution Service job on a local input file", long_about = None)]
struct Cli {
    /// Jobs endpoint of the web service
    #[arg(long, env = "BES_ENDPOINT")]
    endpoint: String,

    /// API key of the web service
    #[arg(long, env = "BES_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Storage account connection string
    #[arg(long, env = "BES_STORAGE_CONNECTION_STRING", hide_env_values = true)]
    storage_connection_string: String,

    /// Storage container for the input and output blobs
    #[arg(long, env = "BES_CONTAINER", default_value = "mycontainer")]
    container: String,

    /// Local input file to upload
    #[arg(long, env = "BES_INPUT_FILE", default_value = "newdatadata.csv")]
    input_file: PathBuf,

    /// Blob name for the uploaded input; keep the input file's extension
    #[arg(long, env = "BES_BLOB_NAME", default_value = "newdatadatablob.csv")]
    blob_name: String,

    /// Web service input the uploaded blob is bound to
    #[arg(long, env = "BES_INPUT_NAME", default_value = "newdata")]
    input_name: String,

    /// Web service output to request, as NAME=BLOB (repeatable)
    #[arg(
        long = "output",
        value_name = "NAME=BLOB",
        value_parser = parse_key_val,
        default_values = [
            "trainedmodel=trainedmodelresults.ilearner",
            "evaluationresult=evaluationresultresults.csv",
        ]
    )]
    outputs: Vec<(String, String)>,

    /// Global parameter for the web service, as KEY=VALUE (repeatable)
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    params: Vec<(String, String)>,

    /// Milliseconds between status checks
    #[arg(long, env = "BES_POLL_INTERVAL_MS", default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Milliseconds to wait for the job before deleting it
    #[arg(long, env = "BES_TIMEOUT_MS", default_value_t = 120_000)]
    timeout_ms: u64,
}

impl Cli {
    fn into_config(self) -> Config {
        Config {
            endpoint: self.endpoint,
            api_key: self.api_key,
            storage_credential: self.storage_connection_string,
            container_name: self.container,
            local_input_path: self.input_file,
            remote_blob_name: self.blob_name,
            input_name: self.input_name,
            outputs: self.outputs.into_iter().collect::<IndexMap<_, _>>(),
            global_parameters: self.params.into_iter().collect::<IndexMap<_, _>>(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Parse a `KEY=VALUE` argument
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, found '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bes=info,bes_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Cli::parse().into_config();
    config.validate().context("Invalid configuration")?;
    info!("Loaded configuration: {:?}", config);

    let batch = Arc::new(BatchClient::new(&config.endpoint, &config.api_key));
    let blobs = Arc::new(
        BlobClient::from_connection_string(&config.storage_credential)
            .context("Failed to parse storage connection string")?,
    );

    let runner = JobRunner::new(config, batch, blobs);
    match runner.run().await {
        Ok(outcome) => {
            report::print_results(&outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report::print_failure(&e);
            Ok(ExitCode::FAILURE)
        }
    }
}
