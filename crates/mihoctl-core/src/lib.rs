// mihoctl-core: Reconciliation layer between mihoctl-api and consumers (CLI/TUI).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod filter;
pub mod input;
pub mod model;
pub mod page;
pub mod state;
pub mod timeseries;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::{ClientConfig, ProbeSettings};
pub use controller::Controller;
pub use error::{CoreError, humanize_error};
pub use event::Event;
pub use input::{EditBuffer, InputMode, Key};
pub use page::Page;
pub use state::ViewState;
pub use timeseries::{ChartData, Series};

// Stream identity and health, surfaced in the status line.
pub use mihoctl_api::stream::{Channel, ChannelState};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ClosedConnection, Connection, ConnectionSnapshot, IpInfo, LatencyOutcome, LatencySample,
    LogEntry, LogLevel, ProxyGroup, ProxyListing, ProxyNode, Rule, SettingKey, format_age,
};
