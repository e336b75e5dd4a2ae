// ── API-to-domain type conversions ──
//
// Bridges raw `mihoctl_api::models` wire types into the `crate::model`
// domain types. Each conversion parses timestamps, normalises the daemon's
// sentinel values (`delay: 0`, `size: -1`), and fills defaults for missing
// optional data.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use mihoctl_api::models as wire;
use mihoctl_api::stream::StreamEvent;

use crate::event::Event;
use crate::model::{
    Connection, ConnectionSnapshot, LatencyOutcome, LatencySample, LogEntry, LogLevel, ProxyGroup,
    ProxyListing, ProxyNode, Rule,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Reason attached to history entries the daemon recorded as `delay: 0`.
const NO_RESPONSE: &str = "no response";

/// Parse an RFC 3339 timestamp; the daemon uses nanosecond precision and
/// local offsets.
fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Proxies ────────────────────────────────────────────────────────

impl From<wire::DelayHistory> for LatencySample {
    fn from(h: wire::DelayHistory) -> Self {
        let outcome = if h.delay == 0 {
            LatencyOutcome::Failed(NO_RESPONSE.into())
        } else {
            LatencyOutcome::Millis(h.delay)
        };
        Self {
            at: parse_datetime(&h.time).unwrap_or(DateTime::UNIX_EPOCH),
            outcome,
        }
    }
}

impl From<wire::Proxy> for ProxyNode {
    fn from(p: wire::Proxy) -> Self {
        Self {
            name: p.name,
            kind: p.kind,
            udp: p.udp,
            history: p.history.into_iter().map(LatencySample::from).collect(),
        }
    }
}

impl ProxyListing {
    /// Build both tables from one `/proxies` listing. Groups are exactly the
    /// entries with a non-empty member list.
    pub fn from_wire(proxies: BTreeMap<String, wire::Proxy>) -> Self {
        let mut listing = Self::default();
        for (key, proxy) in proxies {
            if proxy.is_group() {
                listing.groups.insert(key.clone(), ProxyGroup {
                    name: proxy.name.clone(),
                    kind: proxy.kind.clone(),
                    members: proxy.all.clone(),
                    selected: proxy.now.clone().filter(|n| !n.is_empty()),
                });
            }
            listing.nodes.insert(key, ProxyNode::from(proxy));
        }
        listing
    }
}

// ── Connections ────────────────────────────────────────────────────

impl From<wire::Connection> for Connection {
    fn from(c: wire::Connection) -> Self {
        let m = c.metadata;
        Self {
            start: parse_datetime(&c.start),
            id: c.id,
            network: m.network,
            inbound: m.conn_type,
            source_ip: m.source_ip,
            source_port: m.source_port,
            destination_ip: m.destination_ip,
            destination_port: m.destination_port,
            host: m.host,
            process: m.process,
            upload: c.upload,
            download: c.download,
            upload_speed: c.upload_speed,
            download_speed: c.download_speed,
            chains: c.chains,
            rule: c.rule,
            rule_payload: c.rule_payload,
        }
    }
}

impl From<wire::ConnectionsSnapshot> for ConnectionSnapshot {
    fn from(s: wire::ConnectionsSnapshot) -> Self {
        Self {
            upload_total: s.upload_total,
            download_total: s.download_total,
            connections: s.connections.into_iter().map(Connection::from).collect(),
        }
    }
}

// ── Rules ──────────────────────────────────────────────────────────

/// Number rules by list position.
pub fn rules_from_wire(rules: Vec<wire::Rule>) -> Vec<Rule> {
    rules
        .into_iter()
        .enumerate()
        .map(|(index, r)| Rule {
            index,
            kind: r.kind,
            payload: r.payload,
            target: r.proxy,
            size: r.size.and_then(|s| u64::try_from(s).ok()),
        })
        .collect()
}

// ── Logs ───────────────────────────────────────────────────────────

impl From<wire::LogLine> for LogEntry {
    fn from(l: wire::LogLine) -> Self {
        Self {
            level: LogLevel::parse_lenient(&l.level),
            payload: l.payload,
            received_at: Utc::now(),
        }
    }
}

// ── Stream events ──────────────────────────────────────────────────

impl From<StreamEvent> for Event {
    fn from(event: StreamEvent) -> Self {
        match event {
            StreamEvent::Memory(m) => Event::Memory { inuse: m.inuse },
            StreamEvent::Traffic(t) => Event::Traffic {
                up: t.up,
                down: t.down,
            },
            StreamEvent::Connections(s) => Event::Connections(s.into()),
            StreamEvent::Log(l) => Event::Log(l.into()),
            StreamEvent::ChannelState { channel, state } => Event::ChannelState { channel, state },
        }
    }
}
