//! Transfer primitives for the ingest client.
//!
//! - [`checksum`]: write-through SHA-512 digest and `.sha512` sidecar parsing.
//! - [`ChunkReader`]: reads a file in fixed-size pieces from any offset.
//! - [`TusClient`]: tus 1.0.0 creation + core protocol, driving a
//!   [`Session`] whose [`SessionState`] can be observed while it runs.
//! - [`ProgressTracker`]: periodic observation of a running session.

pub mod checksum;
mod chunked;
mod progress;
mod tus;
mod types;

pub use checksum::{DigestWriter, digest_file, parse_sidecar, sidecar_path};
pub use chunked::ChunkReader;
pub use progress::{ProgressCallback, ProgressHandle, ProgressTracker, SpeedCalculator};
pub use tus::{TusClient, header_pair};
pub use types::{Chunk, Progress, Session, SessionState};

/// Default chunk size: 4 MiB.
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response {status} to {method}: {body}")]
    Protocol {
        method: &'static str,
        status: u16,
        body: String,
    },

    #[error("upload created without a Location header")]
    MissingLocation,

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("server offset {server} does not continue local offset {local}")]
    OffsetMismatch { local: u64, server: u64 },

    #[error("file ended at {offset} bytes, expected {size}")]
    Truncated { offset: u64, size: u64 },
}
