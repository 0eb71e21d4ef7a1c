use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use reqwest::Url;
use reqwest::header::HeaderMap;

/// A piece of file content read for transfer.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Byte offset within the file.
    pub offset: u64,
    /// Raw chunk data.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Offset of the first byte after this chunk.
    pub fn end(&self) -> u64 {
        self.offset + self.data.len() as u64
    }
}

/// Observable state of one upload session.
///
/// Written only by the task driving the upload; any number of observers may
/// read it. The offset never decreases and never exceeds `size`.
#[derive(Debug)]
pub struct SessionState {
    size: u64,
    offset: AtomicU64,
    finished: AtomicBool,
}

impl SessionState {
    pub fn new(size: u64) -> Self {
        Self {
            size,
            offset: AtomicU64::new(0),
            finished: AtomicBool::new(false),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Bytes acknowledged by the server so far.
    pub fn offset(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Moves the offset forward to `offset`, clamped to `size`.
    pub fn advance(&self, offset: u64) {
        self.offset
            .fetch_max(offset.min(self.size), Ordering::AcqRel);
    }

    /// Marks the session complete. Only valid once the offset reached `size`.
    pub fn finish(&self) {
        debug_assert_eq!(self.offset(), self.size);
        self.finished.store(true, Ordering::Release);
    }

    pub fn progress(&self) -> Progress {
        Progress {
            offset: self.offset(),
            size: self.size,
            finished: self.is_finished(),
        }
    }
}

/// Snapshot of a session's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub offset: u64,
    pub size: u64,
    pub finished: bool,
}

impl Progress {
    /// Completion in percent (100 for empty uploads).
    pub fn percentage(&self) -> f64 {
        if self.size == 0 {
            return 100.0;
        }
        self.offset as f64 / self.size as f64 * 100.0
    }

    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.offset)
    }
}

/// A created upload: the file it transfers and where the server expects it.
#[derive(Debug, Clone)]
pub struct Session {
    location: Url,
    path: PathBuf,
    headers: HeaderMap,
    state: Arc<SessionState>,
}

impl Session {
    pub fn new(location: Url, path: PathBuf, headers: HeaderMap, size: u64) -> Self {
        Self {
            location,
            path,
            headers,
            state: Arc::new(SessionState::new(size)),
        }
    }

    /// Upload URL returned by the server.
    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extra headers sent with every request of this session.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn size(&self) -> u64 {
        self.state.size()
    }

    /// Shared handle to the state for observers.
    pub fn state(&self) -> Arc<SessionState> {
        Arc::clone(&self.state)
    }
}
