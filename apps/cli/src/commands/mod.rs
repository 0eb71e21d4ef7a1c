pub mod copy;
pub mod ingest;
pub mod status;
pub mod stored;

use ona_archive_client::Client;
use ona_ingest::IngestError;
use ona_transfer::TusClient;

use crate::config::AppConfig;

/// Management API client for `config`.
pub(crate) fn api_client(config: &AppConfig) -> Result<Client, IngestError> {
    Client::new(&config.client())
        .map_err(|e| IngestError::Config(format!("cannot build API client: {e}")))
}

/// tus client for the staging endpoint in `config`.
pub(crate) fn tus_endpoint(config: &AppConfig) -> Result<TusClient, IngestError> {
    let http = reqwest::Client::builder()
        .danger_accept_invalid_certs(config.tus_accept_invalid_certs)
        .build()
        .map_err(|e| IngestError::Config(format!("cannot build HTTP client: {e}")))?;
    TusClient::new(http, &config.url, config.chunk_size)
        .map_err(|e| IngestError::Config(format!("invalid `url`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> AppConfig {
        toml::from_str(&format!(
            r#"
url = "https://ingest.example.org/files/"
status_url = "https://archive.example.org/api"
jwt_key = "secret"
{extra}
"#
        ))
        .unwrap()
    }

    #[test]
    fn chunk_size_comes_from_config() {
        let tus = tus_endpoint(&config("chunk_size = 1024")).unwrap();
        assert_eq!(tus.chunk_size(), 1024);
        assert_eq!(tus.endpoint().as_str(), "https://ingest.example.org/files/");
    }

    #[test]
    fn unset_chunk_size_uses_default() {
        let tus = tus_endpoint(&config("")).unwrap();
        assert_eq!(tus.chunk_size(), ona_transfer::DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn self_signed_staging_allowed() {
        let tus = tus_endpoint(&config("tus_accept_invalid_certs = true")).unwrap();
        assert_eq!(tus.endpoint().host_str(), Some("ingest.example.org"));
    }

    #[test]
    fn bad_url_is_config_error() {
        let mut bad = config("");
        bad.url = "not a url".into();
        assert_eq!(tus_endpoint(&bad).unwrap_err().exit_code(), 10);
    }
}
