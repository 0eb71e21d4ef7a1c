use std::path::PathBuf;

use clap::Args;
use ona_ingest::{ChecksumMode, CommandExtractor, IngestError, IngestPipeline, IngestRequest};
use tokio::sync::mpsc;
use tracing::info;

use super::{api_client, tus_endpoint};
use crate::config::AppConfig;
use crate::progress::TransferProgressRenderer;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Content package to ingest.
    #[arg(long)]
    pub path: PathBuf,

    /// Metadata JSON: a flat object record or a package metadata root.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Do not show transfer progress.
    #[arg(long, short)]
    pub quiet: bool,

    /// Compute the checksum instead of reading `<path>.sha512`.
    #[arg(long)]
    pub force: bool,

    /// Wait until the archive has processed the upload.
    #[arg(long, conflicts_with = "background")]
    pub wait: bool,

    /// Return right after the upload (default).
    #[arg(long)]
    pub background: bool,
}

impl IngestArgs {
    fn request(&self) -> IngestRequest {
        IngestRequest {
            json: self.json.clone(),
            checksum_mode: if self.force {
                ChecksumMode::Force
            } else {
                ChecksumMode::Sidecar
            },
            quiet: self.quiet,
            wait: self.wait,
            ..IngestRequest::new(&self.path)
        }
    }
}

pub async fn run(config: &AppConfig, args: &IngestArgs) -> Result<(), IngestError> {
    let api = api_client(config)?;
    let endpoint = tus_endpoint(config)?;
    let extractor = CommandExtractor::new(config.extractor());

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let renderer = (!args.quiet).then(|| TransferProgressRenderer::new().spawn(events_rx));

    let result = IngestPipeline::new(&api, &endpoint, &extractor)
        .with_transfer_options(config.transfer())
        .with_poll_options(config.poll())
        .with_events(events_tx)
        .run(&args.request())
        .await;
    if let Some(renderer) = renderer {
        let _ = renderer.await;
    }

    let outcome = result?;
    info!(
        job_id = %outcome.job_id,
        checksum = %outcome.checksum,
        head = %outcome.head,
        files = outcome.files,
        "ingest finished"
    );
    println!(
        "Upload to temporary location is finished. Upload Id: {}",
        outcome.job_id
    );
    if let Some(status) = &outcome.final_status {
        println!("Job {}: {status}", outcome.job_id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(force: bool) -> IngestArgs {
        IngestArgs {
            path: "/data/a.zip".into(),
            json: None,
            quiet: true,
            force,
            wait: true,
            background: false,
        }
    }

    #[test]
    fn force_selects_digest() {
        assert_eq!(args(true).request().checksum_mode, ChecksumMode::Force);
        assert_eq!(args(false).request().checksum_mode, ChecksumMode::Sidecar);
    }

    #[test]
    fn request_carries_flags() {
        let request = args(false).request();
        assert_eq!(request.path, PathBuf::from("/data/a.zip"));
        assert!(request.quiet);
        assert!(request.wait);
    }
}
