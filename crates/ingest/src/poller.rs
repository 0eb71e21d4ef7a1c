//! Job-status polling.

use std::time::Duration;

use ona_protocol::ArchivingStatus;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::api::ArchiveApi;
use crate::error::IngestError;
use crate::types::IngestEvent;

/// Default time between status lookups.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Polling cadence and budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    /// Give up after this many lookups. `None` waits forever.
    pub max_polls: Option<u32>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
        }
    }
}

/// Observes a job record until the archive reports a terminal state.
pub struct StatusPoller<'a> {
    api: &'a dyn ArchiveApi,
    options: PollOptions,
    events: Option<UnboundedSender<IngestEvent>>,
}

impl<'a> StatusPoller<'a> {
    pub fn new(api: &'a dyn ArchiveApi, options: PollOptions) -> Self {
        Self {
            api,
            options,
            events: None,
        }
    }

    pub fn with_events(mut self, events: UnboundedSender<IngestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Polls `job_id` until it is `archived` or `error` and returns that
    /// record. Unknown states and failed lookups keep the loop going.
    pub async fn poll_until_terminal(&self, job_id: &str) -> Result<ArchivingStatus, IngestError> {
        let mut polls = 0u32;
        loop {
            polls += 1;
            let last = match self.api.get_status(job_id).await {
                Ok(record) => {
                    debug!(job_id = %job_id, status = %record.status, polls, "status polled");
                    if let Some(events) = &self.events {
                        let _ = events.send(IngestEvent::StatusPolled {
                            job_id: job_id.to_string(),
                            status: record.status.clone(),
                        });
                    }
                    if record.status.is_terminal() {
                        return Ok(record);
                    }
                    record.status.to_string()
                }
                Err(e) => {
                    warn!(job_id = %job_id, error = %e, "status lookup failed, retrying");
                    e.to_string()
                }
            };

            if self.options.max_polls.is_some_and(|max| polls >= max) {
                return Err(IngestError::Poll {
                    job_id: job_id.to_string(),
                    polls,
                    last,
                });
            }
            tokio::time::sleep(self.options.interval).await;
        }
    }
}
