//! Transfer driver: one resumable session per upload-set entry.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use ona_protocol::constants::headers;
use ona_protocol::Object;
use ona_transfer::{ProgressTracker, Session, TransferError, TusClient, header_pair};
use reqwest::header::{AUTHORIZATION, HeaderMap};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::error::IngestError;
use crate::types::{IngestEvent, TransferOptions};
use crate::upload_set::{UploadEntry, UploadSet};

/// Boxed future returned by [`TransferEndpoint`] methods.
pub type TransferFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransferError>> + Send + 'a>>;

/// Staging endpoint the driver sends files to.
pub trait TransferEndpoint: Send + Sync {
    /// Opens a session for the file at `path` with per-session `headers`.
    fn create<'a>(&'a self, path: &'a Path, headers: HeaderMap) -> TransferFuture<'a, Session>;

    /// Sends the session's bytes; the session state is finished on success.
    fn upload<'a>(&'a self, session: &'a Session) -> TransferFuture<'a, ()>;
}

impl TransferEndpoint for TusClient {
    fn create<'a>(&'a self, path: &'a Path, headers: HeaderMap) -> TransferFuture<'a, Session> {
        Box::pin(TusClient::create(self, path, headers))
    }

    fn upload<'a>(&'a self, session: &'a Session) -> TransferFuture<'a, ()> {
        Box::pin(TusClient::upload(self, session))
    }
}

/// Job-wide values attached to every session.
#[derive(Debug, Clone)]
pub struct TransferJob<'a> {
    pub object: &'a Object,
    pub job_id: &'a str,
    /// Full `Authorization` header value.
    pub authorization: String,
}

/// Sends an [`UploadSet`] entry by entry.
pub struct TransferDriver<'a> {
    endpoint: &'a dyn TransferEndpoint,
    options: TransferOptions,
    quiet: bool,
    events: Option<UnboundedSender<IngestEvent>>,
}

impl<'a> TransferDriver<'a> {
    pub fn new(endpoint: &'a dyn TransferEndpoint, options: TransferOptions) -> Self {
        Self {
            endpoint,
            options,
            quiet: false,
            events: None,
        }
    }

    /// Silent mode: no progress observation.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_events(mut self, events: UnboundedSender<IngestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Transfers every entry in order, stopping at the first failure.
    /// Returns the transfer names that were fully acknowledged.
    pub async fn transfer(
        &self,
        set: &UploadSet,
        job: &TransferJob<'_>,
    ) -> Result<Vec<String>, IngestError> {
        let object_json = serde_json::to_vec(job.object).map_err(|e| IngestError::TransferFailed {
            file: job.object.signature.clone(),
            source: TransferError::InvalidHeader(format!("{}: {e}", headers::OBJECT_JSON)),
        })?;

        let mut sent = Vec::with_capacity(set.len());
        for entry in set.entries() {
            let headers = session_headers(entry, set.is_multi(), job, &object_json)
                .map_err(failed(entry))?;
            self.send(entry, set.len(), headers).await?;
            sent.push(entry.transfer_name.clone());
        }
        Ok(sent)
    }

    async fn send(
        &self,
        entry: &UploadEntry,
        total: usize,
        headers: HeaderMap,
    ) -> Result<(), IngestError> {
        let session = self
            .endpoint
            .create(&entry.path, headers)
            .await
            .map_err(failed(entry))?;
        info!(
            file = %entry.transfer_name,
            index = entry.index,
            size = session.size(),
            location = %session.location(),
            "transfer started"
        );
        self.emit(IngestEvent::TransferStarted {
            file: entry.transfer_name.clone(),
            index: entry.index,
            total,
            size: session.size(),
        });

        let state = session.state();
        let observer = (!self.quiet).then(|| {
            let mut tracker = ProgressTracker::new(Some(self.options.progress_interval));
            if let Some(events) = self.events.clone() {
                let file = entry.transfer_name.clone();
                tracker.on_progress(Box::new(move |progress| {
                    let _ = events.send(IngestEvent::Progress {
                        file: file.clone(),
                        progress,
                    });
                }));
            }
            tracker.start(state.clone())
        });

        let result = self.endpoint.upload(&session).await;

        if let Some(observer) = observer {
            if result.is_ok() && state.is_finished() {
                observer.finished().await;
            } else {
                observer.stop().await;
            }
        }
        result.map_err(failed(entry))?;

        debug!(file = %entry.transfer_name, bytes = state.offset(), "transfer finished");
        self.emit(IngestEvent::TransferFinished {
            file: entry.transfer_name.clone(),
        });
        Ok(())
    }

    fn emit(&self, event: IngestEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}

/// Headers for one session of `job`.
fn session_headers(
    entry: &UploadEntry,
    multi: bool,
    job: &TransferJob<'_>,
    object_json: &[u8],
) -> Result<HeaderMap, TransferError> {
    let mut map = HeaderMap::new();
    let (name, value) = header_pair(AUTHORIZATION.as_str(), job.authorization.as_bytes())?;
    map.insert(name, value);

    let pairs: [(&str, &[u8]); 5] = [
        (headers::OBJECT_JSON, object_json),
        (headers::COLLECTION, job.object.collection_id.as_bytes()),
        (headers::STATUS_ID, job.job_id.as_bytes()),
        (headers::CHECKSUM, job.object.checksum.as_bytes()),
        (headers::FILE_NAME, entry.transfer_name.as_bytes()),
    ];
    for (name, value) in pairs {
        let (name, value) = header_pair(name, value)?;
        map.insert(name, value);
    }
    if multi {
        let (name, value) = header_pair(headers::INDEX, entry.index.to_string().as_bytes())?;
        map.insert(name, value);
    }
    Ok(map)
}

fn failed(entry: &UploadEntry) -> impl FnOnce(TransferError) -> IngestError + '_ {
    move |source| IngestError::TransferFailed {
        file: entry.transfer_name.clone(),
        source,
    }
}
