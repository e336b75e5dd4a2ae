// ── Inbound events ──
//
// Everything that mutates `ViewState` arrives as an `Event` on one queue:
// stream pushes (converted in `crate::convert`) and the completions of
// control calls spawned by the `Controller`.

use mihoctl_api::stream::{Channel, ChannelState};

use crate::model::{
    ConnectionSnapshot, IpInfo, LatencyOutcome, LogEntry, ProxyListing, Rule, SettingKey,
};

#[derive(Debug, Clone)]
pub enum Event {
    // ── Stream pushes ────────────────────────────────────────────────
    Memory { inuse: u64 },
    Traffic { up: u64, down: u64 },
    Connections(ConnectionSnapshot),
    Log(LogEntry),
    ChannelState { channel: Channel, state: ChannelState },

    // ── Control completions ──────────────────────────────────────────
    ProxiesLoaded(ProxyListing),
    /// Selection confirmed; carries the listing fetched right after it.
    ProxySelected {
        group: String,
        proxy: String,
        listing: ProxyListing,
    },
    LatencyTested { node: String, outcome: LatencyOutcome },
    ConnectionsLoaded(ConnectionSnapshot),
    ConnectionClosed { id: String },
    AllConnectionsClosed,
    RulesLoaded(Vec<Rule>),
    /// `info` is `None` when the lookup failed.
    GeoResolved { ip: String, info: Option<IpInfo> },
    VersionLoaded(String),
    SettingSaved { key: SettingKey, value: String },

    /// A control call failed; the text lands in the status line.
    Failed(String),
}
