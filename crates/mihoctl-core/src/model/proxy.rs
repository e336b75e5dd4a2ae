// ── Proxy and group domain types ──

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one latency probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatencyOutcome {
    Millis(u32),
    /// Probe failed; carries the reason when one is known.
    Failed(String),
}

impl LatencyOutcome {
    pub fn millis(&self) -> Option<u32> {
        match self {
            Self::Millis(ms) => Some(*ms),
            Self::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl std::fmt::Display for LatencyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Millis(ms) => write!(f, "{ms}ms"),
            Self::Failed(_) => f.write_str("failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatencySample {
    pub at: DateTime<Utc>,
    pub outcome: LatencyOutcome,
}

/// Any proxy entry: a leaf egress or a nested group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyNode {
    pub name: String,
    /// Daemon-reported kind: `Selector`, `URLTest`, `Shadowsocks`, ...
    pub kind: String,
    pub udp: bool,
    /// Oldest first.
    pub history: Vec<LatencySample>,
}

impl ProxyNode {
    pub fn latest(&self) -> Option<&LatencyOutcome> {
        self.history.last().map(|s| &s.outcome)
    }

    /// Append a probe result.
    pub fn record(&mut self, outcome: LatencyOutcome, at: DateTime<Utc>) {
        self.history.push(LatencySample { at, outcome });
    }
}

/// A node that has members. Members are names, not owned nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyGroup {
    pub name: String,
    pub kind: String,
    pub members: Vec<String>,
    /// Currently selected member; may briefly point outside `members`
    /// between a selection request and the next listing.
    pub selected: Option<String>,
}

impl ProxyGroup {
    pub fn is_selected(&self, member: &str) -> bool {
        self.selected.as_deref() == Some(member)
    }

    /// Only `Selector` groups accept manual selection.
    pub fn is_selectable(&self) -> bool {
        self.kind.eq_ignore_ascii_case("selector")
    }
}

/// One full proxies listing, split into the node table and the derived
/// group table. Both always come from the same response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProxyListing {
    pub nodes: BTreeMap<String, ProxyNode>,
    pub groups: BTreeMap<String, ProxyGroup>,
}
