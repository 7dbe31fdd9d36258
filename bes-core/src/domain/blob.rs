//! Blob reference domain types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Named blob references, in the order the service listed them
pub type BlobMap = IndexMap<String, BlobReference>;

/// Location of a blob the remote job reads or writes
///
/// A reference uses exactly one addressing mode. The wire format is a flat
/// object with all four fields; only the fields of the active mode are set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BlobReferenceWire", into = "BlobReferenceWire")]
pub enum BlobReference {
    /// Storage account connection string plus a path relative to the account
    Account {
        connection_string: String,
        relative_location: String,
    },
    /// Base URL, relative path and a time-limited shared access signature
    SharedAccess {
        base_location: String,
        relative_location: String,
        sas_blob_token: String,
    },
}

impl BlobReference {
    /// Reference addressed through a storage connection string
    pub fn account(connection_string: impl Into<String>, relative_location: impl Into<String>) -> Self {
        Self::Account {
            connection_string: connection_string.into(),
            relative_location: relative_location.into(),
        }
    }

    /// Reference addressed through a shared access signature
    pub fn shared_access(
        base_location: impl Into<String>,
        relative_location: impl Into<String>,
        sas_blob_token: impl Into<String>,
    ) -> Self {
        Self::SharedAccess {
            base_location: base_location.into(),
            relative_location: relative_location.into(),
            sas_blob_token: sas_blob_token.into(),
        }
    }

    pub fn relative_location(&self) -> &str {
        match self {
            Self::Account { relative_location, .. } => relative_location,
            Self::SharedAccess { relative_location, .. } => relative_location,
        }
    }

    pub fn base_location(&self) -> Option<&str> {
        match self {
            Self::Account { .. } => None,
            Self::SharedAccess { base_location, .. } => Some(base_location),
        }
    }

    pub fn sas_blob_token(&self) -> Option<&str> {
        match self {
            Self::Account { .. } => None,
            Self::SharedAccess { sas_blob_token, .. } => Some(sas_blob_token),
        }
    }

    pub fn connection_string(&self) -> Option<&str> {
        match self {
            Self::Account { connection_string, .. } => Some(connection_string),
            Self::SharedAccess { .. } => None,
        }
    }
}

/// Flat JSON shape of a blob reference
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BlobReferenceWire {
    #[serde(default)]
    connection_string: Option<String>,
    #[serde(default)]
    relative_location: Option<String>,
    #[serde(default)]
    base_location: Option<String>,
    #[serde(default)]
    sas_blob_token: Option<String>,
}

fn populated(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

impl TryFrom<BlobReferenceWire> for BlobReference {
    type Error = String;

    fn try_from(wire: BlobReferenceWire) -> Result<Self, Self::Error> {
        let relative_location =
            populated(wire.relative_location).ok_or("blob reference has no RelativeLocation")?;

        match (
            populated(wire.connection_string),
            populated(wire.base_location),
            populated(wire.sas_blob_token),
        ) {
            (Some(connection_string), None, None) => Ok(Self::Account {
                connection_string,
                relative_location,
            }),
            (None, Some(base_location), Some(sas_blob_token)) => Ok(Self::SharedAccess {
                base_location,
                relative_location,
                sas_blob_token,
            }),
            (Some(_), _, _) => Err(format!(
                "blob reference '{}' mixes ConnectionString with shared access fields",
                relative_location
            )),
            (None, _, _) => Err(format!(
                "blob reference '{}' needs either ConnectionString or both BaseLocation and SasBlobToken",
                relative_location
            )),
        }
    }
}

impl From<BlobReference> for BlobReferenceWire {
    fn from(reference: BlobReference) -> Self {
        match reference {
            BlobReference::Account {
                connection_string,
                relative_location,
            } => Self {
                connection_string: Some(connection_string),
                relative_location: Some(relative_location),
                ..Default::default()
            },
            BlobReference::SharedAccess {
                base_location,
                relative_location,
                sas_blob_token,
            } => Self {
                relative_location: Some(relative_location),
                base_location: Some(base_location),
                sas_blob_token: Some(sas_blob_token),
                ..Default::default()
            },
        }
    }
}
