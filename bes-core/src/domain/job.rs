//! Job domain types

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::blob::BlobMap;

/// Status of a batch job as reported by the service
///
/// Each poll returns a full replacement; nothing is merged between polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobStatus {
    pub status_code: StatusCode,
    /// Output locations, only present once the job has finished
    #[serde(default)]
    pub results: Option<BlobMap>,
    /// Error details, only present when the job failed
    #[serde(default)]
    pub details: Option<String>,
}

impl JobStatus {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            results: None,
            details: None,
        }
    }

    pub fn finished(results: BlobMap) -> Self {
        Self {
            status_code: StatusCode::Finished,
            results: Some(results),
            details: None,
        }
    }

    pub fn failed(details: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::Failed,
            results: None,
            details: Some(details.into()),
        }
    }
}

/// Job status code
///
/// Closed set: the service sends either the name or the ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatusCode {
    NotStarted,
    Running,
    Failed,
    Cancelled,
    Finished,
}

impl StatusCode {
    const ALL: [StatusCode; 5] = [
        StatusCode::NotStarted,
        StatusCode::Running,
        StatusCode::Failed,
        StatusCode::Cancelled,
        StatusCode::Finished,
    ];

    /// Whether polling stops at this status
    pub fn is_terminal(self) -> bool {
        match self {
            StatusCode::NotStarted | StatusCode::Running => false,
            StatusCode::Failed | StatusCode::Cancelled | StatusCode::Finished => true,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusCode::NotStarted => "NotStarted",
            StatusCode::Running => "Running",
            StatusCode::Failed => "Failed",
            StatusCode::Cancelled => "Cancelled",
            StatusCode::Finished => "Finished",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == name)
    }

    fn from_ordinal(ordinal: u64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Name(String),
            Ordinal(u64),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Name(name) => StatusCode::from_name(&name)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown status code '{}'", name))),
            Raw::Ordinal(ordinal) => StatusCode::from_ordinal(ordinal).ok_or_else(|| {
                serde::de::Error::custom(format!("unknown status code ordinal {}", ordinal))
            }),
        }
    }
}
