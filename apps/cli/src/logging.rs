//! tracing initialization.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use ona_ingest::IngestError;
use tracing_subscriber::EnvFilter;

use crate::progress::ProgressAwareStderr;

/// Filter directive used when `RUST_LOG` is not set.
///
/// The configured level wins over `-v`; without either only warnings
/// are shown.
pub fn default_directive(level: Option<&str>, verbosity: u8) -> String {
    if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
        return level.to_string();
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
    .to_string()
}

/// Installs the global subscriber. Logs go to `file` (appended, no
/// colors) when given, to stderr otherwise.
pub fn init(level: Option<&str>, verbosity: u8, file: Option<&Path>) -> Result<(), IngestError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = default_directive(level, verbosity);
            EnvFilter::try_new(&directive).map_err(|e| {
                IngestError::Config(format!("invalid log level `{directive}`: {e}"))
            })?
        }
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    IngestError::Config(format!("cannot open log file {}: {e}", path.display()))
                })?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => builder.with_writer(ProgressAwareStderr).try_init(),
    };
    installed.map_err(|e| IngestError::Config(format!("cannot install logger: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(default_directive(None, 0), "warn");
        assert_eq!(default_directive(None, 1), "info");
        assert_eq!(default_directive(None, 2), "debug");
        assert_eq!(default_directive(None, 5), "trace");
    }

    #[test]
    fn configured_level_wins_over_flags() {
        assert_eq!(default_directive(Some("ona_ingest=debug"), 0), "ona_ingest=debug");
        assert_eq!(default_directive(Some("info"), 3), "info");
    }

    #[test]
    fn blank_level_ignored() {
        assert_eq!(default_directive(Some("  "), 1), "info");
    }
}
