// Controller HTTP client
//
// Wraps `reqwest::Client` with mihomo-specific URL construction and status
// handling. Endpoint groups (proxies, connections, rules) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest error body quoted back to the caller.
const MAX_ERROR_BODY: usize = 256;

/// HTTP client for mihomo's external controller.
///
/// Stateless per call: every method issues one request and returns the
/// decoded body. Success is HTTP 200 or 204; 404 surfaces as
/// [`Error::NotFound`], anything else as [`Error::Api`].
#[derive(Debug, Clone)]
pub struct MihomoClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_ms: u64,
}

impl MihomoClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the controller root, e.g. `http://127.0.0.1:9090`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout_ms: transport.timeout_ms(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, timeout_ms: u64) -> Self {
        Self {
            http,
            base_url,
            timeout_ms,
        }
    }

    /// The controller base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{segments...}` with every segment percent-encoded.
    ///
    /// Group and proxy names routinely contain spaces, emoji, and slashes,
    /// so they must never be spliced into the path as raw text.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON body.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url.path());
        let resp = self.http.get(url).send().await.map_err(|e| self.map_send(e))?;
        let body = self.check(resp).await?;
        decode(&body)
    }

    /// Send a GET request with an explicit per-request deadline.
    pub(crate) async fn get_with_timeout<T: DeserializeOwned>(
        &self,
        url: Url,
        timeout: std::time::Duration,
    ) -> Result<T, Error> {
        debug!("GET {}", url.path());
        let resp = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_send_error(e, duration_ms(timeout)))?;
        let body = self.check(resp).await?;
        decode(&body)
    }

    /// Send a PUT request with a JSON body, ignoring the response body.
    pub(crate) async fn put(&self, url: Url, body: &impl Serialize) -> Result<(), Error> {
        debug!("PUT {}", url.path());
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        self.check(resp).await.map(drop)
    }

    /// Send a DELETE request, ignoring the response body.
    pub(crate) async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {}", url.path());
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| self.map_send(e))?;
        self.check(resp).await.map(drop)
    }

    fn map_send(&self, err: reqwest::Error) -> Error {
        map_send_error(err, self.timeout_ms)
    }

    /// Accept 200/204 and return the body text; map everything else.
    async fn check(&self, resp: reqwest::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.map_send(e))?;
        check_status(status, body)
    }
}

/// Split a send failure into timeout vs. transport.
pub(crate) fn map_send_error(err: reqwest::Error, timeout_ms: u64) -> Error {
    if err.is_timeout() {
        Error::Timeout { timeout_ms }
    } else {
        Error::Transport(err)
    }
}

/// Map a response status to success or the matching error.
pub(crate) fn check_status(status: reqwest::StatusCode, body: String) -> Result<String, Error> {
    if status == reqwest::StatusCode::OK || status == reqwest::StatusCode::NO_CONTENT {
        return Ok(body);
    }

    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_owned()
    });

    if status == reqwest::StatusCode::NOT_FOUND {
        Err(Error::NotFound { message })
    } else {
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Pull the daemon's `{"message": "..."}` detail out of an error body,
/// falling back to the (truncated) raw text.
fn error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        return Some(parsed.message);
    }
    Some(trimmed.chars().take(MAX_ERROR_BODY).collect())
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_owned(),
    })
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn duration_ms(d: std::time::Duration) -> u64 {
    d.as_millis() as u64
}
