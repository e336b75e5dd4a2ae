// ── Connections page state ──
//
// Active snapshot, closed-connection history, and the detail view.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};

use crate::filter;
use crate::input::{InputMode, PageInput};
use crate::model::{ClosedConnection, Connection, ConnectionSnapshot, IpInfo};

/// Closed-history bound; oldest entries are evicted first.
pub const MAX_CLOSED: usize = 1000;

/// Geo lookup progress for the detail view.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoState {
    Pending,
    Resolved(IpInfo),
    Unavailable,
}

/// Frozen copy of a connection opened in the detail view.
#[derive(Debug, Clone)]
pub struct DetailState {
    pub connection: Connection,
    pub geo: GeoState,
    pub scroll: u16,
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionsView {
    pub active: Vec<Connection>,
    /// Newest first.
    pub closed: VecDeque<ClosedConnection>,
    pub upload_total: u64,
    pub download_total: u64,
    pub selected: usize,
    pub show_closed: bool,
    pub input: PageInput,
    pub detail: Option<DetailState>,
    pub loaded: bool,
}

impl ConnectionsView {
    /// Reconcile a new snapshot: ids present before but missing now are
    /// closed and prepended to history. Returns how many closed.
    pub fn apply_snapshot(&mut self, snapshot: ConnectionSnapshot, now: DateTime<Utc>) -> usize {
        let current: HashSet<&str> = snapshot
            .connections
            .iter()
            .map(|c| c.id.as_str())
            .collect();

        let gone: Vec<Connection> = self
            .active
            .iter()
            .filter(|c| !current.contains(c.id.as_str()))
            .cloned()
            .collect();
        let closed_count = gone.len();

        // Reverse so the batch keeps its snapshot order at the front.
        for connection in gone.into_iter().rev() {
            self.closed.push_front(ClosedConnection {
                connection,
                closed_at: now,
            });
        }
        self.closed.truncate(MAX_CLOSED);

        self.replace_snapshot(snapshot);
        closed_count
    }

    /// Take a pulled snapshot as-is. Closures are only ever derived from
    /// pushes, so a stale pull cannot record one.
    pub fn replace_snapshot(&mut self, snapshot: ConnectionSnapshot) {
        self.active = snapshot.connections;
        self.upload_total = snapshot.upload_total;
        self.download_total = snapshot.download_total;
        self.loaded = true;
        self.clamp_selection();
    }

    /// Rows the table shows under the active filter.
    pub fn visible(&self) -> Vec<&Connection> {
        let query = self.input.active_filter();
        if self.show_closed {
            filter::filter_connections(self.closed.iter().map(|c| &c.connection), query)
        } else {
            filter::filter_connections(&self.active, query)
        }
    }

    pub fn selected_connection(&self) -> Option<&Connection> {
        self.visible().get(self.selected).copied()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn move_by(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(len - 1);
    }

    pub fn toggle_closed(&mut self) {
        self.show_closed = !self.show_closed;
        self.selected = 0;
    }

    /// Open the detail view on the selected row. Returns the destination
    /// IP to look up, if any.
    pub fn open_detail(&mut self) -> Option<String> {
        let connection = self.selected_connection()?.clone();
        let ip = connection.destination_ip.clone();
        self.detail = Some(DetailState {
            connection,
            geo: if ip.is_empty() {
                GeoState::Unavailable
            } else {
                GeoState::Pending
            },
            scroll: 0,
        });
        self.input.open_detail();
        (!ip.is_empty()).then_some(ip)
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Apply a geo result if the detail view is still showing that IP.
    pub fn resolve_geo(&mut self, ip: &str, info: Option<IpInfo>) {
        if self.input.mode() != InputMode::DetailView {
            return;
        }
        if let Some(detail) = self
            .detail
            .as_mut()
            .filter(|d| d.connection.destination_ip == ip)
        {
            detail.geo = info.map_or(GeoState::Unavailable, GeoState::Resolved);
        }
    }

    /// A single close was confirmed: step the cursor up one row. The row
    /// itself leaves on the next snapshot, which records it as closed.
    pub fn after_close(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn after_close_all(&mut self) {
        self.selected = 0;
        if let Some(detail) = self.detail.as_mut() {
            detail.scroll = 0;
        }
    }
}
