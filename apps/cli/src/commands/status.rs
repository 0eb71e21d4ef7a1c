use clap::Args;
use ona_ingest::{ArchiveApi, IngestError, PollOptions, StatusPoller};
use ona_protocol::{ArchivingStatus, Status};

use super::api_client;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job id printed by `ingest`.
    #[arg(long)]
    pub id: String,

    /// Poll until the job is archived or failed.
    #[arg(long)]
    pub wait: bool,
}

pub async fn run(config: &AppConfig, args: &StatusArgs) -> Result<(), IngestError> {
    let api = api_client(config)?;
    let record = lookup(&api, config.poll(), args).await?;
    println!("{}", record.status);
    check(&record, args)
}

async fn lookup(
    api: &dyn ArchiveApi,
    poll: PollOptions,
    args: &StatusArgs,
) -> Result<ArchivingStatus, IngestError> {
    if args.wait {
        StatusPoller::new(api, poll)
            .poll_until_terminal(&args.id)
            .await
    } else {
        api.get_status(&args.id)
            .await
            .map_err(IngestError::remote("status lookup"))
    }
}

/// A job that ended in `error` fails the command when the caller waited.
fn check(record: &ArchivingStatus, args: &StatusArgs) -> Result<(), IngestError> {
    if args.wait && record.status == Status::Error {
        return Err(IngestError::ArchivingFailed {
            job_id: args.id.clone(),
        });
    }
    Ok(())
}
