//! Job DTOs sent to the Batch Execution Service

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::blob::{BlobMap, BlobReference};

/// Request body that creates a batch job
///
/// Inputs are blobs the job reads, outputs are blobs it writes, and global
/// parameters configure the web service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionRequest {
    pub inputs: BlobMap,
    pub outputs: BlobMap,
    pub global_parameters: IndexMap<String, String>,
}

impl ExecutionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, name: impl Into<String>, reference: BlobReference) -> Self {
        self.inputs.insert(name.into(), reference);
        self
    }

    pub fn with_output(mut self, name: impl Into<String>, reference: BlobReference) -> Self {
        self.outputs.insert(name.into(), reference);
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.global_parameters.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let conn = "DefaultEndpointsProtocol=https;AccountName=a;AccountKey=k";
        let request = ExecutionRequest::new()
            .with_input("newdata", BlobReference::account(conn, "c/in.csv"))
            .with_output("scores", BlobReference::account(conn, "/c/scores.csv"))
            .with_parameter("Threshold", "0.5");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["Inputs"]["newdata"]["RelativeLocation"], json!("c/in.csv"));
        assert_eq!(value["Outputs"]["scores"]["ConnectionString"], json!(conn));
        assert_eq!(value["GlobalParameters"], json!({ "Threshold": "0.5" }));
    }

    #[test]
    fn test_empty_parameters_serialize_as_object() {
        let value = serde_json::to_value(ExecutionRequest::new()).unwrap();
        assert_eq!(value, json!({ "Inputs": {}, "Outputs": {}, "GlobalParameters": {} }));
    }

    #[test]
    fn test_outputs_keep_declaration_order() {
        let request = ExecutionRequest::new()
            .with_output("zeta", BlobReference::account("c", "/c/z"))
            .with_output("alpha", BlobReference::account("c", "/c/a"));

        let body = serde_json::to_string(&request).unwrap();
        assert!(body.find("zeta").unwrap() < body.find("alpha").unwrap());
    }
}
