use std::fmt;

use serde::{Deserialize, Serialize};

/// Digest algorithm name used for sidecar files and the checksum header.
pub const CHECKSUM_TYPE: &str = "sha512";

/// Separator between the hex digest and the original path in a sidecar file.
pub const SIDECAR_SEPARATOR: &str = " *";

/// Status assigned to a job record when it is created.
pub const STATUS_INITIAL_COPYING: &str = "initial copying";

/// Terminal success status of a job record.
pub const STATUS_ARCHIVED: &str = "archived";

/// Terminal failure status of a job record.
pub const STATUS_ERROR: &str = "error";

/// Transfer headers attached to every resumable session.
pub mod headers {
    pub const OBJECT_JSON: &str = "ObjectJson";
    pub const COLLECTION: &str = "Collection";
    pub const STATUS_ID: &str = "StatusId";
    pub const CHECKSUM: &str = "Checksum";
    pub const FILE_NAME: &str = "FileName";
    pub const INDEX: &str = "Index";
}

/// Version marker for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Head {
    /// First stored version of a signature.
    #[serde(rename = "v1")]
    First,
    /// A further version of a signature that is already stored.
    #[serde(rename = "v+")]
    Next,
}

impl Head {
    pub fn as_str(&self) -> &'static str {
        match self {
            Head::First => "v1",
            Head::Next => "v+",
        }
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_wire_values() {
        assert_eq!(Head::First.to_string(), "v1");
        assert_eq!(Head::Next.to_string(), "v+");
        assert_eq!(serde_json::to_string(&Head::Next).unwrap(), "\"v+\"");
    }
}
