//! Ingest orchestration.
//!
//! Stages run strictly in sequence and the first failure ends the run:
//! checksum, duplicate-content check, metadata, version head, capacity,
//! name check, job creation, transfer, and optionally the status wait.

use ona_protocol::{ArchivingStatus, Status};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument};

use crate::api::ArchiveApi;
use crate::checksum::resolve_checksum;
use crate::driver::{TransferDriver, TransferEndpoint, TransferJob};
use crate::error::IngestError;
use crate::extractor::MetadataExtractor;
use crate::guard::Guard;
use crate::metadata::MetadataResolver;
use crate::poller::{PollOptions, StatusPoller};
use crate::types::{IngestEvent, IngestOutcome, IngestRequest, TransferOptions};
use crate::upload_set::{UploadSet, transfer_name};

/// Runs ingests against one archive and one staging endpoint.
pub struct IngestPipeline<'a> {
    api: &'a dyn ArchiveApi,
    endpoint: &'a dyn TransferEndpoint,
    extractor: &'a dyn MetadataExtractor,
    transfer: TransferOptions,
    poll: PollOptions,
    events: Option<UnboundedSender<IngestEvent>>,
}

impl<'a> IngestPipeline<'a> {
    pub fn new(
        api: &'a dyn ArchiveApi,
        endpoint: &'a dyn TransferEndpoint,
        extractor: &'a dyn MetadataExtractor,
    ) -> Self {
        Self {
            api,
            endpoint,
            extractor,
            transfer: TransferOptions::default(),
            poll: PollOptions::default(),
            events: None,
        }
    }

    pub fn with_transfer_options(mut self, options: TransferOptions) -> Self {
        self.transfer = options;
        self
    }

    pub fn with_poll_options(mut self, options: PollOptions) -> Self {
        self.poll = options;
        self
    }

    /// Sends [`IngestEvent`]s to `events` while running.
    pub fn with_events(mut self, events: UnboundedSender<IngestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    #[instrument(skip_all, fields(path = %request.path.display()))]
    pub async fn run(&self, request: &IngestRequest) -> Result<IngestOutcome, IngestError> {
        let content = request.path.as_path();
        let json = request.json.as_deref();
        let size = tokio::fs::metadata(content).await?.len();

        let checksum = resolve_checksum(content, request.checksum_mode).await?;
        let guard = Guard::new(self.api);
        guard.ensure_new_content(&checksum).await?;

        let resolved = MetadataResolver::new(self.extractor)
            .resolve(json, content, &checksum, i64::try_from(size).unwrap_or(i64::MAX))
            .await?;
        let object = resolved.object;

        let head = guard.select_head(&object.signature).await?;
        guard.ensure_capacity(&object, head).await?;
        guard
            .ensure_unique_name(&transfer_name(&object.signature, content), head)
            .await?;

        let job = self
            .api
            .create_status(&ArchivingStatus::initial())
            .await
            .map_err(IngestError::remote("job-status creation"))?;
        info!(job_id = %job.id, signature = %object.signature, head = %head, "job created");
        self.emit(IngestEvent::JobCreated {
            job_id: job.id.clone(),
        });

        let set = UploadSet::build(&object.signature, resolved.kind, json, content);
        let authorization = self
            .api
            .bearer()
            .map_err(IngestError::remote("token issuance"))?;
        let mut driver = TransferDriver::new(self.endpoint, self.transfer).quiet(request.quiet);
        if let Some(events) = &self.events {
            driver = driver.with_events(events.clone());
        }
        let transferred = driver
            .transfer(
                &set,
                &TransferJob {
                    object: &object,
                    job_id: &job.id,
                    authorization,
                },
            )
            .await?;
        info!(job_id = %job.id, files = transferred.len(), "upload to staging finished");

        let final_status = if request.wait {
            let mut poller = StatusPoller::new(self.api, self.poll);
            if let Some(events) = &self.events {
                poller = poller.with_events(events.clone());
            }
            let record = poller.poll_until_terminal(&job.id).await?;
            if record.status == Status::Error {
                return Err(IngestError::ArchivingFailed { job_id: job.id });
            }
            Some(record.status)
        } else {
            None
        };

        Ok(IngestOutcome {
            job_id: job.id,
            checksum,
            signature: object.signature,
            head,
            transferred,
            files: resolved.files.len(),
            final_status,
        })
    }

    fn emit(&self, event: IngestEvent) {
        if let Some(events) = &self.events {
            let _ = events.send(event);
        }
    }
}
