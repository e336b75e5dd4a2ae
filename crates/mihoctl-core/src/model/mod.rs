// ── Domain model ──
//
// Semantic entities the reconciliation core works with. Wire formats live
// in `mihoctl_api::models`; `crate::convert` maps between the two.

mod connection;
mod log;
mod proxy;
mod rule;
mod setting;

pub use connection::{ClosedConnection, Connection, ConnectionSnapshot, format_age};
pub use log::{LogEntry, LogLevel};
pub use proxy::{LatencyOutcome, LatencySample, ProxyGroup, ProxyListing, ProxyNode};
pub use rule::Rule;
pub use setting::SettingKey;

pub use mihoctl_api::models::IpInfo;
