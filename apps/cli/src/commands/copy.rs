use std::path::PathBuf;

use clap::Args;
use ona_ingest::{IngestError, copy_instance};

use super::api_client;
use crate::config::AppConfig;

#[derive(Args, Debug)]
pub struct CopyArgs {
    /// Signature of the object to retrieve.
    #[arg(long)]
    pub signature: String,

    /// Target directory.
    #[arg(long)]
    pub path: PathBuf,
}

pub async fn run(config: &AppConfig, args: &CopyArgs) -> Result<(), IngestError> {
    let storage = config.storage()?;
    let api = api_client(config)?;
    let outcome = copy_instance(&api, &storage, &args.signature, &args.path).await?;
    println!(
        "Copied {} bytes to {}",
        outcome.bytes,
        outcome.destination.display()
    );
    Ok(())
}
