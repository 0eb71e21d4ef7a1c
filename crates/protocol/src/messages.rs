//! Response records of the archive-management API.

use serde::{Deserialize, Serialize};

use crate::types::nullable;

/// Identity part of a stored object record; other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectRef {
    pub id: String,
    pub signature: String,
}

impl ObjectRef {
    /// The service answers an unknown signature with an empty record.
    pub fn exists(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Objects matching a checksum lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objects {
    #[serde(default, deserialize_with = "nullable")]
    pub objects: Vec<ObjectRef>,
}

/// A stored copy of an object on one storage location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectInstance {
    pub id: String,
    pub path: String,
    pub size: i64,
    pub status: String,
    pub object_id: String,
    pub storage_partition_id: String,
}

/// Instances matching a name lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectInstances {
    #[serde(default, deserialize_with = "nullable")]
    pub object_instances: Vec<ObjectInstance>,
}

/// Bare id wrapper. The capacity check reuses it as a message slot:
/// an empty id means the collection can take the upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Id {
    #[serde(default)]
    pub id: String,
}

/// Quality score of an object (`size` holds the score).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeAndId {
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_objects_response() {
        let o: Objects = serde_json::from_str("{}").unwrap();
        assert!(o.objects.is_empty());
    }

    #[test]
    fn objects_response_ignores_extra_fields() {
        let json = r#"{"objects":[{"id":"o1","signature":"s","title":"T","keywords":null}]}"#;
        let o: Objects = serde_json::from_str(json).unwrap();
        assert_eq!(o.objects.len(), 1);
        assert!(o.objects[0].exists());
    }

    #[test]
    fn object_instances_response() {
        let json = r#"{"object_instances":[{"id":"i1","path":"a/b.zip","object_id":"o1","size":10}]}"#;
        let o: ObjectInstances = serde_json::from_str(json).unwrap();
        assert_eq!(o.object_instances.len(), 1);
        assert_eq!(o.object_instances[0].object_id, "o1");
        assert_eq!(o.object_instances[0].path, "a/b.zip");
    }

    #[test]
    fn id_defaults_to_empty() {
        let id: Id = serde_json::from_str("{}").unwrap();
        assert!(id.id.is_empty());
    }
}
