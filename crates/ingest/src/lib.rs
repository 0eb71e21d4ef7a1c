//! Ingest pipeline for a digital-preservation archive.
//!
//! This crate holds the business logic of the `ona` client. It has no
//! CLI or configuration-file dependencies: callers build the collaborators
//! (an [`ArchiveApi`], a [`TransferEndpoint`], a [`MetadataExtractor`])
//! and thread their settings in explicitly.
//!
//! # Pipeline
//!
//! 1. **Checksum**: read the `.sha512` sidecar or hash the package
//! 2. **Dedup**: reject content the archive already holds
//! 3. **Metadata**: decode operator JSON or run the extractor
//! 4. **Guard**: pick the version head, check capacity and the name
//! 5. **Job**: create the job-status record
//! 6. **Transfer**: one resumable session per upload-set entry
//! 7. **Wait**: optionally poll the job until it is terminal

pub mod api;
pub mod checksum;
pub mod copy;
pub mod driver;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod metadata;
pub mod pipeline;
pub mod poller;
pub mod stored;
pub mod types;
pub mod upload_set;

#[cfg(test)]
mod testing;

// Re-export primary types for convenience.
pub use api::ArchiveApi;
pub use checksum::{ChecksumMode, resolve_checksum};
pub use copy::{CopyOutcome, StorageConfig, copy_instance};
pub use driver::{TransferDriver, TransferEndpoint, TransferJob};
pub use error::IngestError;
pub use extractor::{CommandExtractor, ExtractorConfig, MetadataExtractor};
pub use guard::Guard;
pub use metadata::{MetadataResolver, ResolvedMetadata, UploadSetKind};
pub use pipeline::IngestPipeline;
pub use poller::{DEFAULT_POLL_INTERVAL, PollOptions, StatusPoller};
pub use stored::{StorageReport, storage_report};
pub use types::{IngestEvent, IngestOutcome, IngestRequest, TransferOptions};
pub use upload_set::{UploadEntry, UploadSet, sanitize_file_name};
