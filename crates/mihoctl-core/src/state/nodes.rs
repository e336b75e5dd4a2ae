// ── Nodes page state ──
//
// Group/member cursor, the proxy tables, and in-flight latency tests.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::model::{LatencyOutcome, ProxyGroup, ProxyListing, ProxyNode};

/// One failed probe, as shown in the failure list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    pub node: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct NodesView {
    pub listing: ProxyListing,
    /// Index into the sorted group names.
    pub group_index: usize,
    /// Index into the current group's members.
    pub member_index: usize,
    /// Nodes with a probe in flight.
    pub testing: BTreeSet<String>,
    pub failures: Vec<TestFailure>,
    pub failures_expanded: bool,
    pub loaded: bool,
}

impl NodesView {
    pub fn group_names(&self) -> Vec<&str> {
        self.listing.groups.keys().map(String::as_str).collect()
    }

    pub fn current_group(&self) -> Option<&ProxyGroup> {
        self.listing.groups.values().nth(self.group_index)
    }

    pub fn current_member(&self) -> Option<&str> {
        self.current_group()
            .and_then(|g| g.members.get(self.member_index))
            .map(String::as_str)
    }

    pub fn node(&self, name: &str) -> Option<&ProxyNode> {
        self.listing.nodes.get(name)
    }

    pub fn is_testing(&self) -> bool {
        !self.testing.is_empty()
    }

    /// Replace both tables from one listing, keeping the cursor on the same
    /// group and member by name. A member that left falls back to the
    /// clamped position.
    pub fn apply_listing(&mut self, listing: ProxyListing) {
        let previous_group = self.current_group().map(|g| g.name.clone());
        let previous_member = self.current_member().map(str::to_owned);
        self.listing = listing;
        self.loaded = true;

        self.group_index = previous_group
            .and_then(|name| self.listing.groups.keys().position(|k| *k == name))
            .unwrap_or(0);
        let (found, members) = self.current_group().map_or((None, 0), |g| {
            let found = previous_member
                .as_deref()
                .and_then(|name| g.members.iter().position(|m| m == name));
            (found, g.members.len())
        });
        self.member_index =
            found.unwrap_or_else(|| self.member_index.min(members.saturating_sub(1)));
    }

    /// Move to another group; the cursor lands on its selected member.
    fn jump_group(&mut self, index: usize) {
        self.group_index = index;
        self.member_index = self
            .current_group()
            .and_then(|g| {
                g.selected
                    .as_deref()
                    .and_then(|s| g.members.iter().position(|m| m == s))
            })
            .unwrap_or(0);
    }

    pub fn next_group(&mut self) {
        let count = self.listing.groups.len();
        if count > 0 {
            self.jump_group((self.group_index + 1) % count);
        }
    }

    pub fn prev_group(&mut self) {
        let count = self.listing.groups.len();
        if count > 0 {
            self.jump_group((self.group_index + count - 1) % count);
        }
    }

    pub fn move_down(&mut self) {
        let members = self.current_group().map_or(0, |g| g.members.len());
        if self.member_index + 1 < members {
            self.member_index += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.member_index = self.member_index.saturating_sub(1);
    }

    /// Mark nodes as being probed. A batch (test-all) starts a fresh
    /// failure list.
    pub fn begin_tests<'a>(&mut self, nodes: impl IntoIterator<Item = &'a str>, batch: bool) {
        if batch {
            self.failures.clear();
        }
        self.testing.extend(nodes.into_iter().map(str::to_owned));
    }

    /// Record a probe result. Returns `true` when this was the last probe
    /// in flight.
    pub fn record_result(&mut self, node: &str, outcome: LatencyOutcome, at: DateTime<Utc>) -> bool {
        let was_pending = self.testing.remove(node);

        if let LatencyOutcome::Failed(reason) = &outcome {
            self.failures.push(TestFailure {
                node: node.to_owned(),
                reason: reason.clone(),
            });
        }
        if let Some(entry) = self.listing.nodes.get_mut(node) {
            entry.record(outcome, at);
        }

        was_pending && self.testing.is_empty()
    }

    pub fn toggle_failures(&mut self) {
        self.failures_expanded = !self.failures_expanded;
    }

    /// Collapsed form of the failure list.
    pub fn failure_summary(&self) -> Option<String> {
        match self.failures.len() {
            0 => None,
            1 => Some("1 node failed".into()),
            n => Some(format!("{n} nodes failed")),
        }
    }
}
