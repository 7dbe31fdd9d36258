//! Configuration module
//!
//! Run settings: service endpoint and credentials, the input to stage, the
//! outputs to request, and the polling budget.

use std::path::PathBuf;
use std::time::Duration;

use bes_core::domain::blob::BlobReference;
use bes_core::dto::job::ExecutionRequest;
use indexmap::IndexMap;

/// Run configuration
#[derive(Clone)]
pub struct Config {
    /// Jobs endpoint of the batch web service
    pub endpoint: String,

    /// API key of the batch web service
    pub api_key: String,

    /// Storage connection string, also handed to the service in the request
    pub storage_credential: String,

    /// Container holding the input and output blobs
    pub container_name: String,

    /// Local file to upload as the job input
    pub local_input_path: PathBuf,

    /// Blob name the input is uploaded under
    pub remote_blob_name: String,

    /// Name of the web service input the uploaded blob is bound to
    pub input_name: String,

    /// Web service output name to blob name, in declaration order
    pub outputs: IndexMap<String, String>,

    /// Global parameters passed to the web service
    pub global_parameters: IndexMap<String, String>,

    /// Delay between two status checks
    pub poll_interval: Duration,

    /// Budget for the whole polling loop
    pub timeout: Duration,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.endpoint.is_empty() {
            anyhow::bail!("endpoint cannot be empty");
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            anyhow::bail!("endpoint must start with http:// or https://");
        }

        if self.api_key.is_empty() {
            anyhow::bail!("api_key cannot be empty");
        }

        if self.storage_credential.is_empty() {
            anyhow::bail!("storage connection string cannot be empty");
        }

        validate_container_name(&self.container_name)?;

        if self.remote_blob_name.is_empty() {
            anyhow::bail!("blob name cannot be empty");
        }

        if self.input_name.is_empty() {
            anyhow::bail!("input name cannot be empty");
        }

        if self.outputs.is_empty() {
            anyhow::bail!("at least one output must be declared");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }

    /// Builds the request that binds the uploaded blob and the declared outputs
    pub fn build_request(&self) -> ExecutionRequest {
        let input = BlobReference::account(
            &self.storage_credential,
            format!("{}/{}", self.container_name, self.remote_blob_name),
        );
        let mut request = ExecutionRequest::new().with_input(&self.input_name, input);

        for (name, blob) in &self.outputs {
            let output = BlobReference::account(
                &self.storage_credential,
                format!("/{}/{}", self.container_name, blob),
            );
            request = request.with_output(name, output);
        }

        for (name, value) in &self.global_parameters {
            request = request.with_parameter(name, value);
        }

        request
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("endpoint", &self.endpoint)
            .field("container_name", &self.container_name)
            .field("local_input_path", &self.local_input_path)
            .field("remote_blob_name", &self.remote_blob_name)
            .field("input_name", &self.input_name)
            .field("outputs", &self.outputs)
            .field("global_parameters", &self.global_parameters)
            .field("poll_interval", &self.poll_interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Container names: 3-63 chars of lowercase letters, digits and single
/// hyphens, starting and ending with a letter or digit
fn validate_container_name(name: &str) -> anyhow::Result<()> {
    if !(3..=63).contains(&name.len()) {
        anyhow::bail!("container name '{}' must be 3-63 characters long", name);
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        anyhow::bail!(
            "container name '{}' may only contain lowercase letters, digits and hyphens",
            name
        );
    }

    if name.starts_with('-') || name.ends_with('-') || name.contains("--") {
        anyhow::bail!(
            "container name '{}' must start and end with a letter or digit and not repeat hyphens",
            name
        );
    }

    Ok(())
}
