// ── Log domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Daemon log severity, ordered from most to least verbose.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Silent,
}

impl LogLevel {
    /// Parse a daemon level string; anything unrecognised counts as `info`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.parse() {
            Ok(level) => level,
            Err(_) if raw.eq_ignore_ascii_case("warn") => Self::Warning,
            Err(_) => Self::Info,
        }
    }

    /// Next more severe level, saturating at `Silent`.
    pub fn raise(self) -> Self {
        match self {
            Self::Debug => Self::Info,
            Self::Info => Self::Warning,
            Self::Warning => Self::Error,
            Self::Error | Self::Silent => Self::Silent,
        }
    }

    /// Next more verbose level, saturating at `Debug`.
    pub fn lower(self) -> Self {
        match self {
            Self::Debug | Self::Info => Self::Debug,
            Self::Warning => Self::Info,
            Self::Error => Self::Warning,
            Self::Silent => Self::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub payload: String,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Silent);
    }

    #[test]
    fn unknown_level_is_info() {
        assert_eq!(LogLevel::parse_lenient("WARNING"), LogLevel::Warning);
        assert_eq!(LogLevel::parse_lenient("warn"), LogLevel::Warning);
        assert_eq!(LogLevel::parse_lenient("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn raise_and_lower_saturate() {
        assert_eq!(LogLevel::Silent.raise(), LogLevel::Silent);
        assert_eq!(LogLevel::Debug.lower(), LogLevel::Debug);
        assert_eq!(LogLevel::Info.raise().lower(), LogLevel::Info);
    }
}
