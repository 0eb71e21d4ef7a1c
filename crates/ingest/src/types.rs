//! Data types for the ingest flow.

use std::path::PathBuf;
use std::time::Duration;

use ona_protocol::{Head, Status};
use ona_transfer::Progress;

use crate::checksum::ChecksumMode;

/// What to ingest and how.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    /// The content package.
    pub path: PathBuf,
    /// Operator-supplied metadata; extraction is used when absent.
    pub json: Option<PathBuf>,
    pub checksum_mode: ChecksumMode,
    /// Suppress progress observation.
    pub quiet: bool,
    /// Block until the archiving job reaches a terminal state.
    pub wait: bool,
}

impl IngestRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            json: None,
            checksum_mode: ChecksumMode::default(),
            quiet: false,
            wait: false,
        }
    }
}

/// Driver tuning. The chunk size belongs to the endpoint itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOptions {
    /// Progress observation cadence.
    pub progress_interval: Duration,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(65),
        }
    }
}

/// Event emitted while an ingest runs.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    /// The job-status record was created.
    JobCreated { job_id: String },
    /// A file of the upload set is about to be sent.
    TransferStarted {
        file: String,
        index: usize,
        total: usize,
        size: u64,
    },
    /// Snapshot of the running transfer (interactive mode only).
    Progress { file: String, progress: Progress },
    /// A file of the upload set was fully acknowledged.
    TransferFinished { file: String },
    /// A status lookup returned.
    StatusPolled { job_id: String, status: Status },
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    pub job_id: String,
    pub checksum: String,
    pub signature: String,
    pub head: Head,
    /// Transfer names in the order they were sent.
    pub transferred: Vec<String>,
    /// Number of per-file technical metadata records resolved.
    pub files: usize,
    /// Set when the ingest waited for the job.
    pub final_status: Option<Status>,
}
