// ── Core error types ──
//
// User-facing errors from mihoctl-core. Consumers never see HTTP status
// codes or serde failures directly; the `From<mihoctl_api::Error>` impl
// sorts transport-layer errors into the transport / timeout / protocol /
// not-found taxonomy.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach mihomo at {url}: {reason}")]
    Transport { url: String, reason: String },

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Unexpected response from mihomo: {message}")]
    Protocol { message: String },

    #[error("Not found: {identifier}")]
    NotFound { identifier: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("mihomo rejected the request (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Streaming errors ─────────────────────────────────────────────
    #[error("Stream error: {message}")]
    Stream { message: String },
}

impl CoreError {
    /// Whether the daemon was never reached (not running, wrong address).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<mihoctl_api::Error> for CoreError {
    fn from(err: mihoctl_api::Error) -> Self {
        match err {
            mihoctl_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_ms: 0 }
                } else if e.is_decode() {
                    CoreError::Protocol {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        url: e
                            .url()
                            .map(|u| u.origin().ascii_serialization())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: root_cause(e),
                    }
                }
            }
            mihoctl_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            mihoctl_api::Error::InvalidConfig(message) => CoreError::Config { message },
            mihoctl_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            mihoctl_api::Error::NotFound { message } => CoreError::NotFound {
                identifier: message,
            },
            mihoctl_api::Error::Api { status, message } => CoreError::Api { status, message },
            mihoctl_api::Error::WebSocketConnect(message) => CoreError::Stream { message },
            mihoctl_api::Error::Deserialization { message, body: _ } => {
                CoreError::Protocol { message }
            }
        }
    }
}

/// reqwest wraps the interesting part ("Connection refused") several
/// sources deep; surface the innermost message.
fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

// ── Status-line humanization ─────────────────────────────────────────

const ELLIPSIS: &str = "...";
/// Room left on the status line for the hint/key legend.
const STATUS_RESERVED: usize = 20;

/// Turn an error message into something that fits the status line.
///
/// Known failure shapes map to friendlier text; anything else is cut to
/// `width - 20` characters with a trailing ellipsis.
pub fn humanize_error(message: &str, width: usize) -> String {
    let lower = message.to_lowercase();

    if lower.contains("context deadline exceeded") || lower.contains("context dead") {
        return "Test timed out: node may be unavailable".into();
    }
    if lower.contains("connection refused") {
        return "Cannot reach mihomo API: is it running?".into();
    }
    if lower.contains("timeout") || lower.contains("timed out") {
        return "Request timed out".into();
    }

    let max = width.saturating_sub(STATUS_RESERVED).max(ELLIPSIS.len() + 1);
    if message.chars().count() <= max {
        return message.to_owned();
    }
    let kept: String = message.chars().take(max - ELLIPSIS.len()).collect();
    format!("{kept}{ELLIPSIS}")
}
