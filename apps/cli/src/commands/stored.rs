use std::io::IsTerminal;

use clap::Args;
use ona_ingest::{IngestError, StorageReport, storage_report};

use super::api_client;
use crate::config::AppConfig;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

#[derive(Args, Debug)]
pub struct StoredArgs {
    /// Stored file name, e.g. `alma_9912.zip`.
    #[arg(long)]
    pub name: String,
}

pub async fn run(config: &AppConfig, args: &StoredArgs) -> Result<(), IngestError> {
    let api = api_client(config)?;
    let report = storage_report(&api, &args.name).await?;
    for line in render(&report, std::io::stdout().is_terminal()) {
        println!("{line}");
    }
    Ok(())
}

fn render(report: &StorageReport, color: bool) -> Vec<String> {
    let summary = format!(
        "File with name {} is stored on {} storage locations",
        report.name, report.locations
    );
    if report.locations == 0 {
        return vec![summary];
    }
    let quality = format!(
        "Resulting quality: {}, needed quality: {}",
        report.resulting_quality, report.needed_quality
    );
    let quality = match (color, report.is_sufficient()) {
        (false, _) => quality,
        (true, true) => format!("{GREEN}{quality}{RESET}"),
        (true, false) => format!("{RED}{quality}{RESET}"),
    };
    vec![summary, quality]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(locations: usize, resulting: i64, needed: i64) -> StorageReport {
        StorageReport {
            name: "a.zip".into(),
            locations,
            resulting_quality: resulting,
            needed_quality: needed,
        }
    }

    #[test]
    fn not_stored() {
        assert_eq!(
            render(&report(0, 0, 0), true),
            ["File with name a.zip is stored on 0 storage locations"]
        );
    }

    #[test]
    fn sufficient_is_green() {
        let lines = render(&report(2, 3, 2), true);
        assert_eq!(lines[1], format!("{GREEN}Resulting quality: 3, needed quality: 2{RESET}"));
    }

    #[test]
    fn insufficient_is_red() {
        let lines = render(&report(1, 1, 2), true);
        assert!(lines[1].starts_with(RED));
    }

    #[test]
    fn plain_without_terminal() {
        let lines = render(&report(1, 1, 2), false);
        assert_eq!(lines[1], "Resulting quality: 1, needed quality: 2");
    }
}
