// Shared transport configuration for building reqwest::Client instances.
//
// The controller client and the stream client read the same timeout and
// secret from here, so auth and deadlines stay consistent.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

const USER_AGENT: &str = concat!("mihoctl/", env!("CARGO_PKG_VERSION"));

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Per-request deadline. Exceeding it yields [`Error::Timeout`](crate::Error::Timeout).
    pub timeout: Duration,
    /// Bearer secret; `None` (or empty) sends no `Authorization` header.
    pub secret: Option<SecretString>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5000),
            secret: None,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    ///
    /// The bearer header is installed as a sensitive default header so it is
    /// never printed by reqwest's debug output.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.bearer_token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                crate::error::Error::InvalidConfig(format!("secret is not a valid header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(client)
    }

    /// The configured secret, if one is set and non-empty.
    pub fn bearer_token(&self) -> Option<&str> {
        self.secret
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|s| !s.is_empty())
    }

    /// Deadline in whole milliseconds, for error reporting.
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_secret_is_ignored() {
        let config = TransportConfig {
            secret: Some(SecretString::from(String::new())),
            ..TransportConfig::default()
        };
        assert!(config.bearer_token().is_none());
    }

    #[test]
    fn default_timeout_is_five_seconds() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout_ms(), 5000);
        assert!(config.build_client().is_ok());
    }
}
