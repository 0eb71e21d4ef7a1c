use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{STATUS_ARCHIVED, STATUS_ERROR, STATUS_INITIAL_COPYING};

/// Descriptor of an archival package.
///
/// This is the record sent to the staging endpoint in the `ObjectJson`
/// header. `checksum` and `size` are always stamped in by the client and
/// never trusted from operator-supplied JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Object {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub signature: String,
    pub checksum: String,
    pub size: i64,
    pub collection: String,
    pub collection_id: String,
    pub organisation: String,
    pub organisation_id: String,
    pub organisation_address: String,
    pub title: String,
    #[serde(deserialize_with = "nullable")]
    pub alternative_titles: Vec<String>,
    pub description: String,
    #[serde(deserialize_with = "nullable")]
    pub keywords: BTreeSet<String>,
    #[serde(deserialize_with = "nullable")]
    pub identifiers: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub references: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub sets: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub authors: Vec<String>,
    pub ingest_workflow: String,
    pub user: String,
    pub address: String,
    pub created: String,
    pub last_changed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
    /// True when the caller supplied the metadata rather than having it
    /// extracted from the package.
    pub binary: bool,
}

/// Treats an explicit `null` like an absent field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Technical metadata of one file inside a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct File {
    pub checksum: String,
    #[serde(deserialize_with = "nullable")]
    pub name: Vec<String>,
    pub size: i64,
    pub mime_type: String,
    pub pronom: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub object_id: String,
}

/// State of a remote archiving job.
///
/// Only `initial copying`, `archived` and `error` carry meaning for the
/// client; anything else the service reports is kept verbatim and treated
/// as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    InitialCopying,
    Archived,
    Error,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::InitialCopying => STATUS_INITIAL_COPYING,
            Status::Archived => STATUS_ARCHIVED,
            Status::Error => STATUS_ERROR,
            Status::Other(s) => s,
        }
    }

    /// Returns `true` for `archived` and `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Archived | Status::Error)
    }
}

impl From<String> for Status {
    fn from(s: String) -> Self {
        match s.as_str() {
            STATUS_INITIAL_COPYING => Status::InitialCopying,
            STATUS_ARCHIVED => Status::Archived,
            STATUS_ERROR => Status::Error,
            _ => Status::Other(s),
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Self {
        Status::from(s.to_string())
    }
}

impl From<Status> for String {
    fn from(s: Status) -> Self {
        match s {
            Status::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job-status record tracking the asynchronous archiving step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivingStatus {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub status: Status,
}

impl ArchivingStatus {
    /// The record posted to create a new job.
    pub fn initial() -> Self {
        Self {
            id: String::new(),
            status: Status::InitialCopying,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_known_values() {
        assert_eq!(Status::from("initial copying"), Status::InitialCopying);
        assert_eq!(Status::from("archived"), Status::Archived);
        assert_eq!(Status::from("error"), Status::Error);
        assert!(Status::Archived.is_terminal());
        assert!(Status::Error.is_terminal());
        assert!(!Status::InitialCopying.is_terminal());
    }

    #[test]
    fn unknown_status_is_kept_and_not_terminal() {
        let s = Status::from("queued");
        assert_eq!(s, Status::Other("queued".into()));
        assert_eq!(s.to_string(), "queued");
        assert!(!s.is_terminal());
    }

    #[test]
    fn initial_status_serializes_without_id() {
        let json = serde_json::to_string(&ArchivingStatus::initial()).unwrap();
        assert_eq!(json, r#"{"status":"initial copying"}"#);
    }

    #[test]
    fn archiving_status_parses_service_response() {
        let s: ArchivingStatus =
            serde_json::from_str(r#"{"id":"1a11f892","status":"archived"}"#).unwrap();
        assert_eq!(s.id, "1a11f892");
        assert_eq!(s.status, Status::Archived);
    }

    #[test]
    fn object_optional_fields_omitted() {
        let obj = Object {
            signature: "sig".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&obj).unwrap();
        assert!(json.contains("\"signature\":\"sig\""));
        assert!(!json.contains("holding"));
        assert!(!json.contains("expiration"));
        assert!(!json.contains("\"id\""));
    }

    #[test]
    fn flat_object_defaults_missing_fields() {
        let obj: Object =
            serde_json::from_str(r#"{"signature":"s","collection_id":"c","keywords":["b","a","b"]}"#)
                .unwrap();
        assert_eq!(obj.signature, "s");
        assert!(obj.sets.is_empty());
        assert_eq!(obj.keywords.len(), 2);
        assert!(!obj.binary);
    }

    #[test]
    fn flat_object_accepts_null_sequences() {
        let obj: Object =
            serde_json::from_str(r#"{"signature":"s","sets":null,"keywords":null}"#).unwrap();
        assert!(obj.sets.is_empty());
        assert!(obj.keywords.is_empty());
    }
}
