//! Metadata resolution: operator JSON in either shape, or extraction.

use std::path::Path;

use ona_protocol::{File, MetadataDocument, Object};
use tracing::{debug, info};

use crate::error::IngestError;
use crate::extractor::MetadataExtractor;

/// Which files travel to the staging endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSetKind {
    /// Content only.
    SingleFile,
    /// The metadata JSON first, then the content.
    TwoFiles,
}

/// Outcome of metadata resolution.
#[derive(Debug, Clone)]
pub struct ResolvedMetadata {
    pub object: Object,
    pub kind: UploadSetKind,
    /// Per-file technical metadata, when the source carried it.
    pub files: Vec<File>,
}

/// Produces the canonical [`Object`] for a package.
pub struct MetadataResolver<'a> {
    extractor: &'a dyn MetadataExtractor,
}

impl<'a> MetadataResolver<'a> {
    pub fn new(extractor: &'a dyn MetadataExtractor) -> Self {
        Self { extractor }
    }

    /// Resolves metadata from `json` if given, otherwise by extraction from
    /// `content`, then stamps in `checksum`, `size` and the `binary` flag.
    pub async fn resolve(
        &self,
        json: Option<&Path>,
        content: &Path,
        checksum: &str,
        size: i64,
    ) -> Result<ResolvedMetadata, IngestError> {
        let mut resolved = match json {
            Some(json) => {
                let bytes = tokio::fs::read(json).await?;
                from_document(&bytes)?
            }
            None => {
                let root = self.extractor.extract(content).await?;
                let (object, files) = root.resolve()?;
                ResolvedMetadata {
                    object,
                    kind: UploadSetKind::SingleFile,
                    files,
                }
            }
        };

        resolved.object.checksum = checksum.to_string();
        resolved.object.size = size;
        resolved.object.binary = json.is_some();

        info!(
            signature = %resolved.object.signature,
            collection = %resolved.object.collection_id,
            kind = ?resolved.kind,
            files = resolved.files.len(),
            "metadata resolved"
        );
        Ok(resolved)
    }
}

/// Decodes operator-supplied JSON in either of its shapes.
fn from_document(bytes: &[u8]) -> Result<ResolvedMetadata, IngestError> {
    let doc = MetadataDocument::from_slice(bytes)
        .map_err(|e| IngestError::MetadataExtractionFailed(format!("invalid metadata JSON: {e}")))?;

    match doc {
        MetadataDocument::PackageRoot(root) => {
            debug!("metadata JSON is a package metadata root");
            let (object, files) = root.resolve()?;
            Ok(ResolvedMetadata {
                object,
                kind: UploadSetKind::TwoFiles,
                files,
            })
        }
        MetadataDocument::Flat(object) => {
            debug!("metadata JSON is a flat object record");
            if object.signature.is_empty() {
                return Err(IngestError::MetadataFieldMissing("signature"));
            }
            if object.collection_id.is_empty() {
                return Err(IngestError::MetadataFieldMissing("collection_id"));
            }
            Ok(ResolvedMetadata {
                object,
                kind: UploadSetKind::SingleFile,
                files: Vec::new(),
            })
        }
    }
}
