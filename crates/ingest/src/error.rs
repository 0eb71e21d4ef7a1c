//! Ingest error types.

use std::path::PathBuf;

use ona_archive_client::Error as ApiError;
use ona_protocol::PackageError;
use ona_transfer::TransferError;

/// Errors produced by the ingest pipeline and the storage commands.
///
/// Every variant maps to its own process exit code, see
/// [`exit_code`](Self::exit_code).
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no checksum file {} (use --force to compute the checksum)", .sidecar.display())]
    ChecksumUnavailable { sidecar: PathBuf },

    #[error("cannot compute checksum of {}: {source}", .path.display())]
    Digest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("metadata extraction failed: {0}")]
    MetadataExtractionFailed(String),

    #[error("required metadata field missing: {0}")]
    MetadataFieldMissing(&'static str),

    #[error("content with checksum {checksum} is already archived")]
    DuplicateContent { checksum: String },

    #[error("a file named {name} is already archived")]
    DuplicateName { name: String },

    #[error("collection {collection} cannot take the upload: {message}")]
    CapacityExceeded { collection: String, message: String },

    #[error("{operation} failed: {source}")]
    RemoteApi {
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    #[error("transfer of {file} failed: {source}")]
    TransferFailed {
        file: String,
        #[source]
        source: TransferError,
    },

    #[error("job {job_id} not terminal after {polls} polls (last: {last})")]
    Poll {
        job_id: String,
        polls: u32,
        last: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("archiving of job {job_id} ended in error")]
    ArchivingFailed { job_id: String },
}

impl IngestError {
    /// Process exit code for this error kind.
    ///
    /// Codes are stable: 10 through 22, one per kind. Argument errors
    /// are reported by the CLI parser with code 2.
    pub fn exit_code(&self) -> u8 {
        match self {
            IngestError::Config(_) => 10,
            IngestError::ChecksumUnavailable { .. } => 11,
            IngestError::Digest { .. } => 12,
            IngestError::MetadataExtractionFailed(_) => 13,
            IngestError::MetadataFieldMissing(_) => 14,
            IngestError::DuplicateContent { .. } => 15,
            IngestError::DuplicateName { .. } => 16,
            IngestError::CapacityExceeded { .. } => 17,
            IngestError::RemoteApi { .. } => 18,
            IngestError::TransferFailed { .. } => 19,
            IngestError::Poll { .. } => 20,
            IngestError::Io(_) => 21,
            IngestError::ArchivingFailed { .. } => 22,
        }
    }

    /// Wraps a management API failure for `operation`.
    pub fn remote(operation: &'static str) -> impl FnOnce(ApiError) -> Self {
        move |source| IngestError::RemoteApi { operation, source }
    }
}

impl From<PackageError> for IngestError {
    fn from(e: PackageError) -> Self {
        match e {
            PackageError::MissingField(field) => IngestError::MetadataFieldMissing(field),
            other => IngestError::MetadataExtractionFailed(other.to_string()),
        }
    }
}
