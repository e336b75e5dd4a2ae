// Controller API wire types
//
// Models for mihomo's external controller JSON. Field names follow the
// daemon exactly (camelCase with a few upper-case acronyms). The daemon
// emits `null` for empty lists in several places, so list fields go
// through `null_as_default`.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Treat an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Proxies ──────────────────────────────────────────────────────────

/// `GET /proxies` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxiesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub proxies: BTreeMap<String, Proxy>,
}

/// One entry from the proxies listing.
///
/// Groups are not a separate wire entity: a proxy whose `all` list is
/// non-empty is a group, and `now` names its selected member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proxy {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub udp: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub history: Vec<DelayHistory>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub all: Vec<String>,
    #[serde(default)]
    pub now: Option<String>,
}

impl Proxy {
    /// Whether the daemon reports members for this entry.
    pub fn is_group(&self) -> bool {
        !self.all.is_empty()
    }
}

/// One latency sample. `delay == 0` means the probe failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelayHistory {
    pub time: String,
    pub delay: u32,
}

/// `GET /proxies/{name}/delay` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct DelayResponse {
    pub delay: u32,
}

/// `PUT /proxies/{group}` request body.
#[derive(Debug, Serialize)]
pub(crate) struct SelectRequest<'a> {
    pub name: &'a str,
}

// ── Connections ──────────────────────────────────────────────────────

/// Full connections snapshot, from `GET /connections` or the
/// `connections` stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionsSnapshot {
    #[serde(default)]
    pub download_total: u64,
    #[serde(default)]
    pub upload_total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub memory: Option<u64>,
}

/// A single tracked connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: String,
    #[serde(default)]
    pub metadata: ConnectionMetadata,
    #[serde(default)]
    pub upload: u64,
    #[serde(default)]
    pub download: u64,
    /// RFC 3339 start time.
    #[serde(default)]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub chains: Vec<String>,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    pub rule_payload: String,
    #[serde(default)]
    pub download_speed: u64,
    #[serde(default)]
    pub upload_speed: u64,
}

/// Endpoint and classification metadata for a connection.
///
/// Ports arrive as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionMetadata {
    #[serde(default)]
    pub network: String,
    #[serde(default, rename = "type")]
    pub conn_type: String,
    #[serde(default, rename = "sourceIP")]
    pub source_ip: String,
    #[serde(default, rename = "destinationIP")]
    pub destination_ip: String,
    #[serde(default)]
    pub source_port: String,
    #[serde(default)]
    pub destination_port: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub process: String,
    #[serde(default)]
    pub process_path: String,
}

// ── Rules ────────────────────────────────────────────────────────────

/// `GET /rules` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct RulesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rules: Vec<Rule>,
}

/// One routing rule. List position is match priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub proxy: String,
    /// Rule-set entry count; `-1` (or absent) for plain rules.
    #[serde(default)]
    pub size: Option<i64>,
}

// ── Stream payloads ──────────────────────────────────────────────────

/// `memory` stream message.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default)]
    pub inuse: u64,
    #[serde(default)]
    pub oslimit: u64,
}

/// `traffic` stream message, bytes per second.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Traffic {
    #[serde(default)]
    pub up: u64,
    #[serde(default)]
    pub down: u64,
}

/// `logs` stream message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    #[serde(rename = "type")]
    pub level: String,
    #[serde(default)]
    pub payload: String,
}

// ── Misc ─────────────────────────────────────────────────────────────

/// `GET /version` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub version: String,
    #[serde(default)]
    pub meta: bool,
}

/// Geolocation record from the IP lookup service. Every field is optional
/// because the service omits what it does not know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpInfo {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub asn: Option<u64>,
    #[serde(default)]
    pub asn_organization: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub continent_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_without_members_is_not_a_group() {
        let proxy: Proxy = serde_json::from_value(serde_json::json!({
            "name": "A",
            "type": "Shadowsocks",
            "udp": true,
            "history": null
        }))
        .unwrap();
        assert!(!proxy.is_group());
        assert!(proxy.history.is_empty());
        assert!(proxy.now.is_none());
    }

    #[test]
    fn null_connections_list_is_empty() {
        let snapshot: ConnectionsSnapshot = serde_json::from_str(
            r#"{"downloadTotal": 10, "uploadTotal": 5, "connections": null}"#,
        )
        .unwrap();
        assert_eq!(snapshot.download_total, 10);
        assert!(snapshot.connections.is_empty());
    }

    #[test]
    fn connection_metadata_uses_daemon_field_names() {
        let conn: Connection = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "metadata": {
                "network": "tcp",
                "type": "HTTP",
                "sourceIP": "192.168.1.2",
                "destinationIP": "1.1.1.1",
                "sourcePort": "51000",
                "destinationPort": "443",
                "host": "example.com"
            },
            "upload": 10,
            "download": 20,
            "start": "2024-06-15T10:30:00Z",
            "chains": ["Node-A", "Proxy"],
            "rule": "Match",
            "rulePayload": ""
        }))
        .unwrap();

        assert_eq!(conn.metadata.source_ip, "192.168.1.2");
        assert_eq!(conn.metadata.destination_port, "443");
        assert_eq!(conn.metadata.conn_type, "HTTP");

        let round = serde_json::to_value(&conn).unwrap();
        assert_eq!(round["metadata"]["destinationIP"], "1.1.1.1");
        assert_eq!(round["rulePayload"], "");
    }
}
