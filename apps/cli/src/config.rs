//! Configuration file handling.
//!
//! One TOML file holds everything; it is parsed and validated once and then
//! split into the typed settings each component takes in its constructor.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use ona_archive_client::ClientConfig;
use ona_ingest::{ExtractorConfig, IngestError, PollOptions, StorageConfig, TransferOptions};
use reqwest::Url;
use serde::Deserialize;

fn default_bar_pause_ms() -> u64 {
    65
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_token_ttl_secs() -> u64 {
    6000
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// tus endpoint base URL.
    pub url: String,
    /// Archive-management API base URL.
    pub status_url: String,
    /// Shared secret for bearer tokens.
    pub jwt_key: String,
    #[serde(default)]
    pub chunk_size: usize,
    #[serde(default = "default_bar_pause_ms")]
    pub bar_pause_ms: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Skip certificate checks toward the tus endpoint.
    #[serde(default)]
    pub tus_accept_invalid_certs: bool,
    #[serde(default)]
    pub storage: Option<StorageSection>,
    #[serde(default)]
    pub extractor: Option<ExtractorSection>,
    #[serde(default)]
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    pub name: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractorSection {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    /// `EnvFilter` directive, e.g. `info` or `ona_ingest=debug`.
    pub level: Option<String>,
    /// Append logs to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self, IngestError> {
        Self::read(path).map_err(|e| IngestError::Config(format!("{e:#}")))
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let config: AppConfig =
            toml::from_str(&text).with_context(|| format!("invalid {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        for (key, value) in [("url", &self.url), ("status_url", &self.status_url)] {
            let url = Url::parse(value).with_context(|| format!("`{key}` is not a URL"))?;
            anyhow::ensure!(
                matches!(url.scheme(), "http" | "https"),
                "`{key}` must be an http(s) URL, got {value}"
            );
        }
        anyhow::ensure!(!self.jwt_key.is_empty(), "`jwt_key` must not be empty");
        anyhow::ensure!(self.poll_interval_secs > 0, "`poll_interval_secs` must be positive");
        if let Some(storage) = &self.storage {
            anyhow::ensure!(!storage.name.is_empty(), "`storage.name` must not be empty");
        }
        Ok(())
    }

    pub fn client(&self) -> ClientConfig {
        ClientConfig {
            token_ttl: Duration::from_secs(self.token_ttl_secs),
            timeout: Duration::from_secs(self.request_timeout_secs),
            ..ClientConfig::new(&self.status_url, &self.jwt_key)
        }
    }

    pub fn transfer(&self) -> TransferOptions {
        TransferOptions {
            progress_interval: Duration::from_millis(self.bar_pause_ms.max(1)),
        }
    }

    pub fn poll(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_polls: None,
        }
    }

    /// Extractor settings; empty when none is configured.
    pub fn extractor(&self) -> ExtractorConfig {
        self.extractor
            .as_ref()
            .map(|e| ExtractorConfig {
                program: e.program.clone(),
                args: e.args.clone(),
            })
            .unwrap_or_default()
    }

    pub fn storage(&self) -> Result<StorageConfig, IngestError> {
        self.storage
            .as_ref()
            .map(|s| StorageConfig {
                name: s.name.clone(),
                root: s.root.clone(),
            })
            .ok_or_else(|| IngestError::Config("no [storage] section configured".into()))
    }
}
