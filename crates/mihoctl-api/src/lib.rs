// mihoctl-api: Async Rust client for the mihomo external controller (REST + WebSocket)

pub mod client;
pub mod error;
pub mod geo;
pub mod models;
pub mod stream;
pub mod transport;

mod connections;
mod proxies;

pub use client::MihomoClient;
pub use proxies::groups_of;
pub use error::Error;
pub use geo::GeoClient;
pub use stream::{Channel, ChannelState, ReconnectConfig, StreamClient, StreamConfig, StreamEvent};
pub use transport::TransportConfig;
