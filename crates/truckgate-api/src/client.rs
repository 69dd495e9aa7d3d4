// Gate backend HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and response parsing for
// the backend's two error body shapes. Endpoint groups (cameras,
// detection, plates, system) are inherent methods in sibling modules.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Ack, ErrorBody};
use crate::transport::TransportConfig;

/// Raw HTTP client for the gate backend.
///
/// Cheap to clone (the inner `reqwest::Client` is reference counted), so
/// background tasks take their own copy instead of sharing a lock.
#[derive(Debug, Clone)]
pub struct GateClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl GateClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root, e.g. `http://localhost:5001`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: 0,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build a full URL for an `/api/{path}` endpoint.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(&format!("api/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).send().await.map_err(|e| self.map_send(e))?;
        self.parse(resp).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &impl Serialize,
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        self.parse(resp).await
    }

    /// Send a body-less POST and require a successful `{success}` ack.
    pub(crate) async fn post_ack(&self, url: Url) -> Result<Ack, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).send().await.map_err(|e| self.map_send(e))?;
        let ack: Ack = self.parse(resp).await?;
        require_success(ack)
    }

    /// Send a DELETE request and require a successful `{success}` ack.
    pub(crate) async fn delete_ack(&self, url: Url) -> Result<Ack, Error> {
        debug!("DELETE {}", url);
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        let ack: Ack = self.parse(resp).await?;
        require_success(ack)
    }

    fn map_send(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(err)
        }
    }

    /// Map non-2xx statuses to `Error::Api`, otherwise decode `T`.
    async fn parse<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send(e))?;

        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = parsed
                .error
                .or(parsed.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_owned()
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
                details: parsed.details,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}

/// Ensure the base path ends in `/` so `Url::join` appends instead of replacing.
fn normalize_base(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

pub(crate) fn require_success(ack: Ack) -> Result<Ack, Error> {
    if ack.success {
        Ok(ack)
    } else {
        Err(Error::Rejected {
            message: ack
                .message
                .unwrap_or_else(|| "backend reported failure".into()),
        })
    }
}
