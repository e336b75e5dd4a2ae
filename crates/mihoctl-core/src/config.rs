// ── Runtime connection configuration ──
//
// Describes *how* to reach the daemon and how to probe nodes. Never touches
// disk; the CLI/TUI builds a `ClientConfig` from `mihoctl-config` and hands
// it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Connection and probe settings for a [`Controller`](crate::Controller).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Controller root, e.g. `http://127.0.0.1:9090`.
    pub api_address: Url,
    pub secret: Option<SecretString>,
    /// URL each latency probe fetches through the node.
    pub test_url: String,
    /// Deadline for control calls and latency probes.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_address: Url) -> Self {
        Self {
            api_address,
            secret: None,
            test_url: "http://www.gstatic.com/generate_204".into(),
            timeout: Duration::from_millis(5000),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// The subset of settings that can change while running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeSettings {
    pub test_url: String,
    pub timeout_ms: u64,
}
