// ── Connection domain types ──

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One tracked connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub id: String,
    /// `tcp` / `udp`.
    pub network: String,
    /// Inbound type: `HTTP`, `Socks5`, `Tun`, ...
    pub inbound: String,
    pub source_ip: String,
    pub source_port: String,
    pub destination_ip: String,
    pub destination_port: String,
    pub host: String,
    pub process: String,
    pub upload: u64,
    pub download: u64,
    pub upload_speed: u64,
    pub download_speed: u64,
    pub start: Option<DateTime<Utc>>,
    /// Hops in the order the daemon reports them.
    pub chains: Vec<String>,
    pub rule: String,
    pub rule_payload: String,
}

impl Connection {
    /// Host name when the daemon sniffed one, else the destination IP.
    pub fn target(&self) -> &str {
        if self.host.is_empty() {
            &self.destination_ip
        } else {
            &self.host
        }
    }

    /// Effective egress: the last hop, or `DIRECT` when there is none.
    pub fn egress(&self) -> &str {
        self.chains.last().map_or("DIRECT", String::as_str)
    }

    /// `network/type`, e.g. `tcp/HTTPS`.
    pub fn transport(&self) -> String {
        format!("{}/{}", self.network, self.inbound)
    }

    /// Time since the connection started, or zero if unknown.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.start
            .map(|s| (now - s).max(chrono::Duration::zero()))
            .unwrap_or_else(chrono::Duration::zero)
    }
}

/// Compact age: `42s`, `7m`, `3h12m`.
pub fn format_age(age: chrono::Duration) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        0..60 => format!("{secs}s"),
        60..3600 => format!("{}m", secs / 60),
        _ => format!("{}h{}m", secs / 3600, (secs % 3600) / 60),
    }
}

/// A connection that disappeared from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClosedConnection {
    pub connection: Connection,
    pub closed_at: DateTime<Utc>,
}

/// Point-in-time listing of all connections plus cumulative totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionSnapshot {
    pub upload_total: u64,
    pub download_total: u64,
    pub connections: Vec<Connection>,
}
