//! tus 1.0.0 client (creation extension + core protocol).
//!
//! A session is created with `POST <endpoint>` announcing the total length,
//! then the file is sent in `PATCH` requests carrying the current offset.
//! The offset the server returns in each response is authoritative; a `409`
//! is answered with a `HEAD` to learn the server's offset before resuming.

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, LOCATION};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::chunked::ChunkReader;
use crate::types::Session;
use crate::{DEFAULT_CHUNK_SIZE, TransferError};

const TUS_VERSION: &str = "1.0.0";
const TUS_RESUMABLE: &str = "tus-resumable";
const UPLOAD_LENGTH: &str = "upload-length";
const UPLOAD_OFFSET: &str = "upload-offset";
const UPLOAD_METADATA: &str = "upload-metadata";
const OFFSET_CONTENT_TYPE: &str = "application/offset+octet-stream";

/// Consecutive `409` answers tolerated before giving up.
const MAX_CONFLICTS: u32 = 3;

/// Client for one tus endpoint.
#[derive(Debug, Clone)]
pub struct TusClient {
    http: reqwest::Client,
    endpoint: Url,
    chunk_size: usize,
    headers: HeaderMap,
}

impl TusClient {
    /// Creates a client for `endpoint`. A `chunk_size` of 0 selects the
    /// default of 4 MiB.
    pub fn new(
        http: reqwest::Client,
        endpoint: &str,
        chunk_size: usize,
    ) -> Result<Self, TransferError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| TransferError::InvalidUrl(format!("{endpoint}: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(TUS_RESUMABLE, HeaderValue::from_static(TUS_VERSION));
        Ok(Self {
            http,
            endpoint,
            chunk_size: if chunk_size == 0 {
                DEFAULT_CHUNK_SIZE
            } else {
                chunk_size
            },
            headers,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Creates an upload for the file at `path`.
    ///
    /// `headers` are attached to the creation request and to every request
    /// of the resulting session. A zero-length file yields a session that is
    /// already finished.
    pub async fn create(&self, path: &Path, headers: HeaderMap) -> Result<Session, TransferError> {
        let size = tokio::fs::metadata(path).await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = format!("filename {}", STANDARD.encode(name.as_bytes()));

        let resp = self
            .http
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .headers(headers.clone())
            .header(UPLOAD_LENGTH, size)
            .header(UPLOAD_METADATA, metadata)
            .send()
            .await?;

        if resp.status() != StatusCode::CREATED {
            return Err(status_error("POST", resp).await);
        }
        let location = resp
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(TransferError::MissingLocation)?;
        let location = self
            .endpoint
            .join(location)
            .map_err(|e| TransferError::InvalidUrl(format!("{location}: {e}")))?;

        debug!(location = %location, size, file = %path.display(), "upload created");

        let session = Session::new(location, path.to_path_buf(), headers, size);
        if size == 0 {
            session.state().finish();
        }
        Ok(session)
    }

    /// Sends the file of `session` until the server has acknowledged all bytes.
    pub async fn upload(&self, session: &Session) -> Result<(), TransferError> {
        let state = session.state();
        let size = state.size();
        if state.is_finished() {
            return Ok(());
        }

        let mut reader = ChunkReader::open(session.path(), self.chunk_size).await?;
        reader.seek_to(state.offset()).await?;
        let mut conflicts = 0;

        while state.offset() < size {
            let local = state.offset();
            let chunk = reader
                .next_chunk()
                .await?
                .ok_or(TransferError::Truncated {
                    offset: local,
                    size,
                })?;
            let end = chunk.end();

            let resp = self
                .request(Method::PATCH, session)
                .header(UPLOAD_OFFSET, chunk.offset)
                .header(CONTENT_TYPE, OFFSET_CONTENT_TYPE)
                .body(chunk.data)
                .send()
                .await?;

            let status = resp.status();
            if status == StatusCode::CONFLICT && conflicts < MAX_CONFLICTS {
                conflicts += 1;
                let server = self.server_offset(session).await?;
                warn!(local, server, "offset conflict, resuming from server offset");
                if server < local || server > size {
                    return Err(TransferError::OffsetMismatch { local, server });
                }
                state.advance(server);
                reader.seek_to(server).await?;
                continue;
            }
            if !status.is_success() {
                return Err(status_error("PATCH", resp).await);
            }
            conflicts = 0;

            let server = upload_offset(resp.headers())?;
            if server <= local || server > size {
                return Err(TransferError::OffsetMismatch { local, server });
            }
            state.advance(server);
            if server != end {
                reader.seek_to(server).await?;
            }
            debug!(offset = server, size, "chunk acknowledged");
        }

        state.finish();
        Ok(())
    }

    /// Asks the server how many bytes of `session` it holds.
    async fn server_offset(&self, session: &Session) -> Result<u64, TransferError> {
        let resp = self.request(Method::HEAD, session).send().await?;
        if !resp.status().is_success() {
            return Err(status_error("HEAD", resp).await);
        }
        upload_offset(resp.headers())
    }

    fn request(&self, method: Method, session: &Session) -> RequestBuilder {
        self.http
            .request(method, session.location().clone())
            .headers(self.headers.clone())
            .headers(session.headers().clone())
    }
}

/// Builds a header pair, accepting non-ASCII values as opaque bytes.
pub fn header_pair(
    name: &str,
    value: &[u8],
) -> Result<(HeaderName, HeaderValue), TransferError> {
    let header = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| TransferError::InvalidHeader(format!("{name}: {e}")))?;
    let value = HeaderValue::from_bytes(value)
        .map_err(|e| TransferError::InvalidHeader(format!("{name}: {e}")))?;
    Ok((header, value))
}

fn upload_offset(headers: &HeaderMap) -> Result<u64, TransferError> {
    headers
        .get(UPLOAD_OFFSET)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .ok_or_else(|| TransferError::InvalidHeader("missing or invalid Upload-Offset".into()))
}

async fn status_error(method: &'static str, resp: Response) -> TransferError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    TransferError::Protocol {
        method,
        status,
        body,
    }
}
