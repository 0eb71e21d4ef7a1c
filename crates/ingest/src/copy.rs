//! Retrieval of a stored instance from a locally mounted storage location.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::ArchiveApi;
use crate::error::IngestError;

/// Storage location the client can read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Location name as known to the archive.
    pub name: String,
    /// Local mount point instance paths are resolved against.
    pub root: PathBuf,
}

/// Result of [`copy_instance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
}

/// Copies the instance of `signature` stored at `storage` into `dir` as
/// `<signature>.zip`, with `:` replaced by `_`.
pub async fn copy_instance(
    api: &dyn ArchiveApi,
    storage: &StorageConfig,
    signature: &str,
    dir: &Path,
) -> Result<CopyOutcome, IngestError> {
    let instance = api
        .object_instance_by_signature_and_location(signature, &storage.name)
        .await
        .map_err(IngestError::remote("object-instance lookup by signature and location"))?;
    if instance.path.is_empty() {
        return Err(IngestError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no instance of {signature} at {}", storage.name),
        )));
    }

    let source = storage.root.join(instance.path.trim_start_matches('/'));
    let destination = dir.join(format!("{}.zip", signature.replace(':', "_")));
    tokio::fs::create_dir_all(dir).await?;
    let bytes = tokio::fs::copy(&source, &destination).await?;

    info!(
        signature = %signature,
        source = %source.display(),
        destination = %destination.display(),
        bytes,
        "instance copied"
    );
    Ok(CopyOutcome {
        source,
        destination,
        bytes,
    })
}
