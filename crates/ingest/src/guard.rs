//! Dedup, version-head and capacity checks against the archive.
//!
//! Each check is a single remote call that either lets the pipeline
//! continue or stops it; none is retried.

use ona_protocol::{Head, Object};
use tracing::{debug, info};

use crate::api::ArchiveApi;
use crate::error::IngestError;

/// Pre-transfer checks for one package.
pub struct Guard<'a> {
    api: &'a dyn ArchiveApi,
}

impl<'a> Guard<'a> {
    pub fn new(api: &'a dyn ArchiveApi) -> Self {
        Self { api }
    }

    /// Fails with `DuplicateContent` if any stored object has `checksum`.
    pub async fn ensure_new_content(&self, checksum: &str) -> Result<(), IngestError> {
        let found = self
            .api
            .objects_by_checksum(checksum)
            .await
            .map_err(IngestError::remote("object lookup by checksum"))?;
        if !found.objects.is_empty() {
            info!(checksum = %checksum, matches = found.objects.len(), "content already archived");
            return Err(IngestError::DuplicateContent {
                checksum: checksum.to_string(),
            });
        }
        Ok(())
    }

    /// `v+` if a version of `signature` is already stored, `v1` otherwise.
    pub async fn select_head(&self, signature: &str) -> Result<Head, IngestError> {
        let existing = self
            .api
            .object_by_signature(signature)
            .await
            .map_err(IngestError::remote("object lookup by signature"))?;
        let head = if existing.exists() {
            Head::Next
        } else {
            Head::First
        };
        debug!(signature = %signature, head = %head, "version head selected");
        Ok(head)
    }

    /// Fails with `CapacityExceeded` unless the collection accepts the bytes.
    pub async fn ensure_capacity(&self, object: &Object, head: Head) -> Result<(), IngestError> {
        let answer = self
            .api
            .storage_location_status(&object.collection_id, object.size, &object.signature, head)
            .await
            .map_err(IngestError::remote("capacity check"))?;
        if !answer.id.is_empty() {
            return Err(IngestError::CapacityExceeded {
                collection: object.collection_id.clone(),
                message: answer.id,
            });
        }
        Ok(())
    }

    /// Fails with `DuplicateName` if a first version would reuse a stored
    /// file name. New versions keep the name of their predecessors.
    pub async fn ensure_unique_name(&self, name: &str, head: Head) -> Result<(), IngestError> {
        if head == Head::Next {
            return Ok(());
        }
        let instances = self
            .api
            .object_instances_by_name(name)
            .await
            .map_err(IngestError::remote("object-instance lookup by name"))?;
        if !instances.object_instances.is_empty() {
            return Err(IngestError::DuplicateName {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
