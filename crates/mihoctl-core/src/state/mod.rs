// ── Canonical view state ──
//
// `ViewState` is owned by the event loop and mutated only through
// `apply` (inbound events) and `crate::dispatch` (keys). Nothing here is
// shared across tasks.

mod connections;
mod logs;
mod nodes;
mod rules;
mod settings;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use mihoctl_api::stream::{Channel, ChannelState};
use tracing::debug;

use crate::command::Command;
use crate::event::Event;
use crate::input::{InputMode, PageInput};
use crate::model::{ConnectionSnapshot, SettingKey};
use crate::page::Page;
use crate::timeseries::ChartData;

pub use connections::{ConnectionsView, DetailState, GeoState, MAX_CLOSED};
pub use logs::{H_SCROLL_STEP, LogsView, MAX_LOGS};
pub use nodes::{NodesView, TestFailure};
pub use rules::RulesView;
pub use settings::SettingsView;

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub page: Page,
    pub nodes: NodesView,
    pub connections: ConnectionsView,
    pub logs: LogsView,
    pub rules: RulesView,
    pub settings: SettingsView,
    pub charts: ChartData,
    /// Last reported state per push channel.
    pub channels: HashMap<Channel, ChannelState>,
    pub daemon_version: Option<String>,
    /// Raw text of the most recent failure; humanized at render time.
    pub last_error: Option<String>,
    /// Transient confirmation shown in the status line.
    pub notice: Option<String>,
    pub quit: bool,
}

impl ViewState {
    pub fn new(settings: impl IntoIterator<Item = (SettingKey, String)>) -> Self {
        Self {
            settings: SettingsView::new(settings),
            ..Self::default()
        }
    }

    /// Commands to issue once the loop is up.
    pub fn startup_commands(&self) -> Vec<Command> {
        let mut commands = vec![Command::RefreshProxies, Command::FetchVersion];
        if self.page.wants_streams() {
            commands.push(Command::StartStreams);
        }
        commands
    }

    /// Input mode of the page in front.
    pub fn mode(&self) -> InputMode {
        self.page_input().map_or(InputMode::Normal, PageInput::mode)
    }

    pub fn page_input(&self) -> Option<&PageInput> {
        match self.page {
            Page::Connections => Some(&self.connections.input),
            Page::Logs => Some(&self.logs.input),
            Page::Rules => Some(&self.rules.input),
            Page::Settings => Some(&self.settings.input),
            Page::Nodes | Page::Help => None,
        }
    }

    pub fn page_input_mut(&mut self) -> Option<&mut PageInput> {
        match self.page {
            Page::Connections => Some(&mut self.connections.input),
            Page::Logs => Some(&mut self.logs.input),
            Page::Rules => Some(&mut self.rules.input),
            Page::Settings => Some(&mut self.settings.input),
            Page::Nodes | Page::Help => None,
        }
    }

    pub fn channel_state(&self, channel: Channel) -> ChannelState {
        self.channels
            .get(&channel)
            .copied()
            .unwrap_or(ChannelState::Disconnected)
    }

    pub fn apply(&mut self, event: Event) -> Vec<Command> {
        self.apply_at(event, Utc::now())
    }

    /// Apply one inbound event, stamping anything time-based with `now`.
    /// Returns follow-up commands.
    pub fn apply_at(&mut self, event: Event, now: DateTime<Utc>) -> Vec<Command> {
        match event {
            // ── Stream pushes ────────────────────────────────────────
            Event::Memory { inuse } => self.charts.record_memory(inuse),
            Event::Traffic { up, down } => self.charts.record_traffic(up, down),
            Event::Connections(snapshot) => {
                self.charts
                    .record_totals(snapshot.upload_total, snapshot.download_total);
                self.charts
                    .record_connection_count(snapshot.connections.len());
                self.reconcile_connections(snapshot, now);
            }
            Event::Log(entry) => self.logs.push(entry),
            Event::ChannelState { channel, state } => {
                self.channels.insert(channel, state);
            }

            // ── Control completions ──────────────────────────────────
            Event::ProxiesLoaded(listing) => self.nodes.apply_listing(listing),
            Event::ProxySelected {
                group,
                proxy,
                listing,
            } => {
                self.nodes.apply_listing(listing);
                self.notice = Some(format!("{group} → {proxy}"));
            }
            Event::LatencyTested { node, outcome } => {
                if self.nodes.record_result(&node, outcome, now) {
                    return vec![Command::RefreshProxies];
                }
            }
            Event::ConnectionsLoaded(snapshot) => {
                // A live push is newer than any pull in flight.
                let streaming =
                    self.channel_state(Channel::Connections) == ChannelState::Streaming;
                if streaming && self.connections.loaded {
                    debug!("ignoring pulled connections while streaming");
                } else {
                    self.connections.replace_snapshot(snapshot);
                }
            }
            Event::ConnectionClosed { id } => {
                self.connections.after_close();
                self.notice = Some(format!("Closed connection {id}"));
            }
            Event::AllConnectionsClosed => {
                self.connections.after_close_all();
                self.notice = Some("Closed all connections".into());
            }
            Event::RulesLoaded(rules) => self.rules.replace(rules),
            Event::GeoResolved { ip, info } => self.connections.resolve_geo(&ip, info),
            Event::VersionLoaded(version) => self.daemon_version = Some(version),
            Event::SettingSaved { key, value } => {
                self.settings.set(key, value);
                self.notice = Some(match key {
                    SettingKey::ApiAddress | SettingKey::Secret => {
                        format!("Saved {key}; restart to reconnect")
                    }
                    SettingKey::TestUrl | SettingKey::Timeout => format!("Saved {key}"),
                });
            }
            Event::Failed(message) => self.last_error = Some(message),
        }
        Vec::new()
    }

    fn reconcile_connections(&mut self, snapshot: ConnectionSnapshot, now: DateTime<Utc>) {
        let closed = self.connections.apply_snapshot(snapshot, now);
        if closed > 0 {
            debug!(closed, "connections closed since last snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{
        Connection, LatencyOutcome, LogEntry, LogLevel, ProxyGroup, ProxyListing, ProxyNode,
    };

    fn conn(id: &str) -> Connection {
        Connection {
            id: id.into(),
            network: "tcp".into(),
            inbound: "HTTP".into(),
            source_ip: "10.0.0.2".into(),
            source_port: "50000".into(),
            destination_ip: "1.1.1.1".into(),
            destination_port: "443".into(),
            host: format!("{id}.example.com"),
            process: String::new(),
            upload: 0,
            download: 0,
            upload_speed: 0,
            download_speed: 0,
            start: None,
            chains: vec!["DIRECT".into()],
            rule: "Match".into(),
            rule_payload: String::new(),
        }
    }

    fn snapshot(ids: &[&str]) -> Event {
        Event::Connections(ConnectionSnapshot {
            upload_total: 0,
            download_total: 0,
            connections: ids.iter().map(|id| conn(id)).collect(),
        })
    }

    fn closed_ids(state: &ViewState) -> Vec<String> {
        state
            .connections
            .closed
            .iter()
            .map(|c| c.connection.id.clone())
            .collect()
    }

    fn node(name: &str) -> ProxyNode {
        ProxyNode {
            name: name.into(),
            kind: "Shadowsocks".into(),
            udp: true,
            history: Vec::new(),
        }
    }

    fn listing(selected: &str) -> ProxyListing {
        let mut nodes = BTreeMap::new();
        for name in ["A", "B", "C"] {
            nodes.insert(name.to_owned(), node(name));
        }
        let mut groups = BTreeMap::new();
        groups.insert(
            "Proxy".to_owned(),
            ProxyGroup {
                name: "Proxy".into(),
                kind: "Selector".into(),
                members: vec!["A".into(), "B".into(), "C".into()],
                selected: Some(selected.into()),
            },
        );
        ProxyListing { nodes, groups }
    }

    #[test]
    fn missing_ids_move_to_history_newest_first() {
        let mut state = ViewState::default();
        state.apply(snapshot(&["a", "b", "c"]));
        assert!(state.connections.closed.is_empty());

        state.apply(snapshot(&["b"]));
        assert_eq!(closed_ids(&state), vec!["a", "c"]);

        state.apply(snapshot(&["d"]));
        assert_eq!(closed_ids(&state), vec!["b", "a", "c"]);

        // Repeating a snapshot closes nothing new.
        state.apply(snapshot(&["d"]));
        assert_eq!(closed_ids(&state).len(), 3);
    }

    fn pulled(ids: &[&str]) -> Event {
        match snapshot(ids) {
            Event::Connections(s) => Event::ConnectionsLoaded(s),
            other => other,
        }
    }

    #[test]
    fn stale_pull_never_records_a_closure() {
        let mut state = ViewState::default();
        state.apply(snapshot(&["a", "x"]));
        state.apply(pulled(&["a"]));
        assert!(state.connections.closed.is_empty());

        state.apply(snapshot(&["a", "x"]));
        state.apply(snapshot(&["a"]));
        assert_eq!(closed_ids(&state), vec!["x"]);
    }

    #[test]
    fn pull_is_ignored_while_streaming() {
        let mut state = ViewState::default();
        state.apply(Event::ChannelState {
            channel: Channel::Connections,
            state: ChannelState::Streaming,
        });
        state.apply(snapshot(&["a", "b"]));
        state.apply(pulled(&["a"]));
        let active: Vec<&str> = state
            .connections
            .active
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(active, vec!["a", "b"]);
    }

    #[test]
    fn closed_history_is_capped() {
        let mut state = ViewState::default();
        for i in 0..(MAX_CLOSED + 50) {
            let id = format!("c{i}");
            state.apply(snapshot(&[id.as_str()]));
        }
        state.apply(snapshot(&[]));
        assert_eq!(state.connections.closed.len(), MAX_CLOSED);
        // Newest closure first, oldest evicted.
        assert_eq!(
            state.connections.closed.front().map(|c| c.connection.id.as_str()),
            Some(format!("c{}", MAX_CLOSED + 49).as_str())
        );
        assert!(!closed_ids(&state).contains(&"c0".to_owned()));
    }

    #[test]
    fn stream_gap_keeps_last_snapshot() {
        let mut state = ViewState::default();
        state.apply(snapshot(&["a", "b"]));
        state.apply(Event::ChannelState {
            channel: Channel::Connections,
            state: ChannelState::Disconnected,
        });
        assert_eq!(state.connections.active.len(), 2);
        assert_eq!(
            state.channel_state(Channel::Connections),
            ChannelState::Disconnected
        );
    }

    #[test]
    fn log_ring_is_capped_newest_first() {
        let mut state = ViewState::default();
        for i in 0..(MAX_LOGS + 10) {
            state.apply(Event::Log(LogEntry {
                level: LogLevel::Info,
                payload: format!("line {i}"),
                received_at: Utc::now(),
            }));
        }
        assert_eq!(state.logs.entries.len(), MAX_LOGS);
        assert_eq!(
            state.logs.entries.front().map(|e| e.payload.as_str()),
            Some(format!("line {}", MAX_LOGS + 9).as_str())
        );
    }

    #[test]
    fn selection_updates_group_and_nodes_together() {
        let mut state = ViewState::default();
        state.apply(Event::ProxiesLoaded(listing("A")));
        state.apply(Event::ProxySelected {
            group: "Proxy".into(),
            proxy: "B".into(),
            listing: listing("B"),
        });
        let group = state.nodes.current_group().unwrap();
        assert!(group.is_selected("B"));
        assert!(state.nodes.node("B").is_some());
        assert_eq!(state.notice.as_deref(), Some("Proxy → B"));
    }

    #[test]
    fn test_all_collects_failures_and_refreshes_when_done() {
        let mut state = ViewState::default();
        state.apply(Event::ProxiesLoaded(listing("A")));
        state.nodes.begin_tests(["A", "B", "C"], true);

        let follow = state.apply(Event::LatencyTested {
            node: "A".into(),
            outcome: LatencyOutcome::Millis(120),
        });
        assert!(follow.is_empty());
        state.apply(Event::LatencyTested {
            node: "B".into(),
            outcome: LatencyOutcome::Failed("timeout".into()),
        });
        let follow = state.apply(Event::LatencyTested {
            node: "C".into(),
            outcome: LatencyOutcome::Millis(80),
        });

        assert_eq!(follow, vec![Command::RefreshProxies]);
        assert!(!state.nodes.is_testing());
        assert_eq!(state.nodes.failures.len(), 1);
        assert_eq!(state.nodes.failures[0].node, "B");
        assert_eq!(state.nodes.failure_summary().as_deref(), Some("1 node failed"));
        assert_eq!(
            state.nodes.node("A").and_then(ProxyNode::latest),
            Some(&LatencyOutcome::Millis(120))
        );
        assert_eq!(
            state.nodes.node("C").and_then(ProxyNode::latest),
            Some(&LatencyOutcome::Millis(80))
        );
    }

    #[test]
    fn group_cursor_survives_refresh_by_name() {
        let mut state = ViewState::default();
        let mut two = listing("A");
        two.groups.insert(
            "Auto".into(),
            ProxyGroup {
                name: "Auto".into(),
                kind: "URLTest".into(),
                members: vec!["A".into()],
                selected: Some("A".into()),
            },
        );
        state.apply(Event::ProxiesLoaded(two.clone()));
        state.nodes.next_group();
        assert_eq!(state.nodes.current_group().unwrap().name, "Proxy");

        // A refresh where "Auto" vanished keeps "Proxy" in front.
        state.apply(Event::ProxiesLoaded(listing("A")));
        assert_eq!(state.nodes.current_group().unwrap().name, "Proxy");
    }

    #[test]
    fn member_cursor_follows_name_across_refresh() {
        let mut state = ViewState::default();
        state.apply(Event::ProxiesLoaded(listing("A")));
        state.nodes.move_down();
        assert_eq!(state.nodes.current_member(), Some("B"));

        // Reordered: B moves to the end.
        let mut reordered = listing("A");
        if let Some(group) = reordered.groups.get_mut("Proxy") {
            group.members = vec!["C".into(), "A".into(), "B".into()];
        }
        state.apply(Event::ProxiesLoaded(reordered));
        assert_eq!(state.nodes.current_member(), Some("B"));
        assert_eq!(state.nodes.member_index, 2);

        // B removed: the clamped position wins.
        let mut shrunk = listing("A");
        if let Some(group) = shrunk.groups.get_mut("Proxy") {
            group.members = vec!["C".into(), "A".into()];
        }
        state.apply(Event::ProxiesLoaded(shrunk));
        assert_eq!(state.nodes.current_member(), Some("A"));
    }

    #[test]
    fn snapshot_totals_feed_charts_until_traffic_arrives() {
        let mut state = ViewState::default();
        let totals = |up, down| {
            Event::Connections(ConnectionSnapshot {
                upload_total: up,
                download_total: down,
                connections: Vec::new(),
            })
        };
        state.apply(totals(100, 1000));
        state.apply(totals(150, 900));
        assert_eq!(state.charts.upload.to_vec(), vec![50]);
        assert_eq!(state.charts.download.to_vec(), vec![0]);
        assert_eq!(state.charts.connections.to_vec(), vec![0, 0]);
    }

    #[test]
    fn failure_sets_last_error() {
        let mut state = ViewState::default();
        state.apply(Event::Failed("dial tcp: connection refused".into()));
        assert_eq!(
            state.last_error.as_deref(),
            Some("dial tcp: connection refused")
        );
    }
}
