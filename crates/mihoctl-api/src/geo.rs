// IP geolocation lookup
//
// Best-effort enrichment for the connection detail view. Callers treat any
// error as "unavailable"; nothing here is retried.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::client::{check_status, decode, map_send_error};
use crate::error::Error;
use crate::models::IpInfo;

const DEFAULT_BASE_URL: &str = "https://api.ip.sb/geoip/";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
// The public service rejects obviously non-browser agents.
const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Client for the third-party IP geolocation service.
#[derive(Debug, Clone)]
pub struct GeoClient {
    http: reqwest::Client,
    base_url: Url,
}

impl GeoClient {
    /// Client against the public lookup service.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(Url::parse(DEFAULT_BASE_URL)?)
    }

    /// Client against an alternate endpoint. `base_url` must end in `/`;
    /// the IP is appended as the final path segment.
    pub fn with_base_url(base_url: Url) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// Look up one IP address.
    pub async fn lookup(&self, ip: &str) -> Result<IpInfo, Error> {
        let url = self.base_url.join(ip)?;
        debug!(ip, "geo lookup");

        #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
        let timeout_ms = LOOKUP_TIMEOUT.as_millis() as u64;

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| map_send_error(e, timeout_ms))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| map_send_error(e, timeout_ms))?;
        let body = check_status(status, body)?;
        decode(&body)
    }
}
