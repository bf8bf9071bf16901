// Record collection HTTP client
//
// Wraps `reqwest::Client` around a single collection endpoint. The
// whole collection is returned by one GET; there is no pagination.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::RecordResponse;
use crate::transport::TransportConfig;

/// Raw HTTP client for a remote record collection.
///
/// Non-success status codes are surfaced as [`Error::Status`] with the
/// response body preserved; undecodable payloads become
/// [`Error::Deserialization`].
#[derive(Debug, Clone)]
pub struct RecordClient {
    http: reqwest::Client,
    endpoint: Url,
    timeout: Option<Duration>,
}

impl RecordClient {
    /// Create a client for `endpoint` from a `TransportConfig`.
    ///
    /// `endpoint` is the full URL of the collection resource, e.g.
    /// `https://jsonplaceholder.typicode.com/posts`.
    pub fn new(endpoint: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            endpoint,
            timeout: Some(transport.timeout),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn from_reqwest(endpoint: &str, http: reqwest::Client) -> Result<Self, Error> {
        let endpoint = Url::parse(endpoint)?;
        Ok(Self {
            http,
            endpoint,
            timeout: None,
        })
    }

    /// The collection endpoint this client reads from.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch the full record collection.
    pub async fn list_records(&self) -> Result<Vec<RecordResponse>, Error> {
        self.get_json(self.endpoint.clone()).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "endpoint returned non-success status");
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}
