//! Archive-management API client.
//!
//! Async HTTP client using `reqwest`. Each request is signed with a fresh
//! bearer token from [`TokenIssuer`].

use std::fmt;
use std::time::Duration;

use ona_protocol::{
    ArchivingStatus, Head, Id, ObjectInstance, ObjectInstances, ObjectRef, Objects, SizeAndId,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::token::{DEFAULT_TTL, TokenIssuer};

/// Characters escaped in path segments (everything but RFC 3986 unreserved).
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the archive-management client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot sign token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

/// Connection settings for the management API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL, e.g. `https://archive.example/api`.
    pub base_url: String,
    /// HS256 shared secret.
    pub jwt_key: String,
    pub token_ttl: Duration,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, jwt_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            jwt_key: jwt_key.into(),
            token_ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Which quality score to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Quality the stored copies actually reach.
    Resulting,
    /// Quality the collection requires.
    Needed,
}

impl Quality {
    fn path(&self) -> &'static str {
        match self {
            Quality::Resulting => "resulting-quality",
            Quality::Needed => "needed-quality",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Archive-management API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    tokens: TokenIssuer,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens: TokenIssuer::new(&config.jwt_key, config.token_ttl),
        })
    }

    /// Token issuer shared with the transfer endpoint.
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Sends an authenticated request; anything but `200 OK` is an error.
    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, Error> {
        let resp = req
            .header(AUTHORIZATION, self.tokens.bearer()?)
            .send()
            .await?;
        let status = resp.status();

        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.url(segments);
        debug!(url = %url, "GET");
        self.send(self.http.get(&url)).await
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        for segment in segments {
            url.push('/');
            url.extend(utf8_percent_encode(segment, SEGMENT));
        }
        url
    }

    /// Objects already stored with this checksum.
    pub async fn objects_by_checksum(&self, checksum: &str) -> Result<Objects, Error> {
        self.get(&["object", checksum]).await
    }

    /// Object stored under `signature`; an empty id if there is none.
    pub async fn object_by_signature(&self, signature: &str) -> Result<ObjectRef, Error> {
        self.get(&["object", "signature", signature]).await
    }

    /// Stored instances whose file name is `name`.
    pub async fn object_instances_by_name(&self, name: &str) -> Result<ObjectInstances, Error> {
        self.get(&["object-instance", name]).await
    }

    /// Instance of `signature` on the storage location called `location`.
    pub async fn object_instance_by_signature_and_location(
        &self,
        signature: &str,
        location: &str,
    ) -> Result<ObjectInstance, Error> {
        self.get(&[
            "object-instance",
            "signature-and-location",
            signature,
            location,
        ])
        .await
    }

    /// Asks whether the collection can take `size` more bytes.
    ///
    /// The answer's id is empty when it can; otherwise it holds the reason.
    pub async fn storage_location_status(
        &self,
        collection_alias: &str,
        size: i64,
        signature: &str,
        head: Head,
    ) -> Result<Id, Error> {
        let size = size.to_string();
        self.get(&[
            "storage-location",
            "collection",
            collection_alias,
            &size,
            signature,
            head.as_str(),
        ])
        .await
    }

    pub async fn quality_for_object(
        &self,
        object_id: &str,
        quality: Quality,
    ) -> Result<SizeAndId, Error> {
        self.get(&["object", quality.path(), object_id]).await
    }

    /// Registers a new job record.
    pub async fn create_status(&self, status: &ArchivingStatus) -> Result<ArchivingStatus, Error> {
        // The collection route is registered with a trailing slash.
        let url = format!("{}/", self.url(&["status"]));
        debug!(url = %url, status = %status.status, "POST");
        self.send(self.http.post(&url).json(status)).await
    }

    pub async fn get_status(&self, id: &str) -> Result<ArchivingStatus, Error> {
        self.get(&["status", id]).await
    }
}
