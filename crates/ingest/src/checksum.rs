//! Content checksum resolution.

use std::io;
use std::path::Path;

use ona_transfer::checksum::{digest_file, parse_sidecar, sidecar_path};
use tracing::debug;

use crate::error::IngestError;

/// Where the checksum comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumMode {
    /// Read `<file>.sha512` next to the content file.
    #[default]
    Sidecar,
    /// Hash the content file, ignoring any sidecar.
    Force,
}

/// Resolves the lowercase hex SHA-512 of the file at `path`.
pub async fn resolve_checksum(path: &Path, mode: ChecksumMode) -> Result<String, IngestError> {
    match mode {
        ChecksumMode::Sidecar => {
            let sidecar = sidecar_path(path);
            let contents = match tokio::fs::read_to_string(&sidecar).await {
                Ok(contents) => contents,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::NotFound | io::ErrorKind::InvalidData
                    ) =>
                {
                    return Err(IngestError::ChecksumUnavailable { sidecar });
                }
                Err(e) => return Err(IngestError::Io(e)),
            };
            let checksum =
                parse_sidecar(&contents).ok_or(IngestError::ChecksumUnavailable {
                    sidecar: sidecar.clone(),
                })?;
            debug!(sidecar = %sidecar.display(), checksum = %checksum, "checksum read from sidecar");
            Ok(checksum)
        }
        ChecksumMode::Force => {
            let owned = path.to_path_buf();
            let checksum = tokio::task::spawn_blocking(move || digest_file(&owned))
                .await
                .map_err(io::Error::other)
                .and_then(|r| r)
                .map_err(|source| IngestError::Digest {
                    path: path.to_path_buf(),
                    source,
                })?;
            debug!(file = %path.display(), checksum = %checksum, "checksum computed");
            Ok(checksum)
        }
    }
}
