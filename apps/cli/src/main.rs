//! ona: ingest packages into the archive and inspect what it holds.

mod commands;
mod config;
mod logging;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use ona_ingest::IngestError;
use tracing::{Instrument, error, info_span};

use config::AppConfig;

/// Ingest client for the digital-preservation archive.
#[derive(Parser, Debug)]
#[command(name = "ona", version, about)]
struct Cli {
    /// Configuration file.
    #[arg(long, short, env = "ONA_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Checksum, check, register and upload a package.
    Ingest(commands::ingest::IngestArgs),
    /// Show the state of an archiving job.
    Status(commands::status::StatusArgs),
    /// Report where a file is stored and with which quality.
    Stored(commands::stored::StoredArgs),
    /// Copy a stored package out of a mounted storage location.
    Copy(commands::copy::CopyArgs),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Ingest(_) => "ingest",
            Command::Status(_) => "status",
            Command::Stored(_) => "stored",
            Command::Copy(_) => "copy",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, code = e.exit_code(), "command failed");
            eprintln!("error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), IngestError> {
    let path = cli.config.ok_or_else(|| {
        IngestError::Config("no configuration file; pass --config or set ONA_CONFIG".into())
    })?;
    let config = AppConfig::load(&path)?;
    logging::init(
        config.log.level.as_deref(),
        cli.verbose,
        config.log.file.as_deref(),
    )?;

    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_default();
    let span = info_span!("ona", host = %host, command = cli.command.name());

    async {
        match &cli.command {
            Command::Ingest(args) => commands::ingest::run(&config, args).await,
            Command::Status(args) => commands::status::run(&config, args).await,
            Command::Stored(args) => commands::stored::run(&config, args).await,
            Command::Copy(args) => commands::copy::run(&config, args).await,
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ingest() {
        let cli = Cli::try_parse_from([
            "ona", "-vv", "--config", "ona.toml", "ingest", "--path", "a.zip", "--force", "--wait",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("ona.toml")));
        match cli.command {
            Command::Ingest(args) => {
                assert!(args.force);
                assert!(args.wait);
                assert!(args.json.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn wait_conflicts_with_background() {
        let err = Cli::try_parse_from([
            "ona", "ingest", "--path", "a.zip", "--wait", "--background",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn config_after_subcommand() {
        let cli = Cli::try_parse_from(["ona", "stored", "--name", "a.zip", "--config", "c.toml"])
            .unwrap();
        assert_eq!(cli.command.name(), "stored");
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    }

    #[test]
    fn copy_requires_signature() {
        assert!(Cli::try_parse_from(["ona", "copy", "--path", "/tmp"]).is_err());
    }

    #[tokio::test]
    async fn missing_config_is_config_error() {
        let cli = Cli::try_parse_from(["ona", "status", "--id", "j1"]).unwrap();
        let cli = Cli { config: None, ..cli };
        let err = run(cli).await.unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }
}
