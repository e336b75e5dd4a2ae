//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use mihoctl_config::ConfigError;
use mihoctl_core::CoreError;

/// Process exit codes. Anything that went wrong is a plain failure.
pub mod exit_code {
    pub const FAILURE: i32 = 1;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to mihomo at {url}")]
    #[diagnostic(
        code(mihoctl::connection_failed),
        help(
            "Check that mihomo is running with external-controller enabled.\n\
             Reason: {reason}\n\
             Set the address with: mihoctl config set api_address <url>"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(mihoctl::timeout),
        help("Increase the timeout with --timeout or: mihoctl config set timeout <ms>")
    )]
    Timeout { timeout_ms: u64 },

    // ── Daemon responses ─────────────────────────────────────────────

    #[error("Not found: {message}")]
    #[diagnostic(
        code(mihoctl::not_found),
        help("Run: mihoctl {list_command} to see what exists")
    )]
    NotFound { message: String, list_command: String },

    #[error("mihomo rejected the request (HTTP {status}): {message}")]
    #[diagnostic(
        code(mihoctl::api_error),
        help("A 401 usually means the secret is wrong: mihoctl config set secret <secret>")
    )]
    ApiError { status: u16, message: String },

    #[error("Unexpected response from mihomo: {message}")]
    #[diagnostic(code(mihoctl::protocol))]
    Protocol { message: String },

    // ── Latency ──────────────────────────────────────────────────────

    #[error("Latency test for '{node}' failed: {reason}")]
    #[diagnostic(
        code(mihoctl::probe_failed),
        help("The node may be down, or the probe URL unreachable through it (--url)")
    )]
    ProbeFailed { node: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(mihoctl::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("{source}")]
    #[diagnostic(
        code(mihoctl::config),
        help("Fix the file at: {path}\nOr recreate it with: mihoctl config init")
    )]
    Config {
        #[source]
        source: ConfigError,
        path: String,
    },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        exit_code::FAILURE
    }
}

impl From<ConfigError> for CliError {
    fn from(source: ConfigError) -> Self {
        match source {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownKey { .. } => Self::Validation {
                field: "key".into(),
                reason: source.to_string(),
            },
            other => Self::Config {
                source: other,
                path: mihoctl_config::config_path().display().to_string(),
            },
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Transport { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_ms } => CliError::Timeout { timeout_ms },
            CoreError::Protocol { message } | CoreError::Stream { message } => {
                CliError::Protocol { message }
            }
            CoreError::NotFound { identifier } => CliError::NotFound {
                message: identifier,
                list_command: "list".into(),
            },
            CoreError::Api { status, message } => CliError::ApiError { status, message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}
