//! WebSocket subscriptions with per-channel auto-reconnect.
//!
//! mihomo pushes four independent streams: `memory`, `traffic`,
//! `connections`, and `logs`. [`StreamClient`] runs one background task per
//! channel, decodes each frame into a typed [`StreamEvent`], and forwards it
//! into a single bounded `mpsc` queue owned by the caller. Forwarding never
//! blocks: when the queue is full the event is dropped, so a slow consumer
//! sees stale data instead of stalling the socket reads.
//!
//! # Example
//!
//! ```rust,ignore
//! use mihoctl_api::stream::{StreamClient, StreamConfig, StreamEvent, EVENT_QUEUE_CAPACITY};
//! use tokio::sync::mpsc;
//! use url::Url;
//!
//! let (tx, mut rx) = mpsc::channel::<StreamEvent>(EVENT_QUEUE_CAPACITY);
//! let config = StreamConfig::new(Url::parse("http://127.0.0.1:9090")?, None);
//! let streams = StreamClient::new(config, tx);
//! streams.start()?;
//!
//! while let Some(event) = rx.recv().await {
//!     println!("{event:?}");
//! }
//!
//! streams.stop();
//! ```

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::{ConnectionsSnapshot, LogLine, Memory, Traffic};

// ── Queue capacity ───────────────────────────────────────────────────

/// Suggested capacity for the shared inbound queue.
pub const EVENT_QUEUE_CAPACITY: usize = 100;

// ── Channel ──────────────────────────────────────────────────────────

/// One of the daemon's push subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Memory,
    Traffic,
    Connections,
    Logs,
}

impl Channel {
    pub const ALL: [Self; 4] = [Self::Memory, Self::Traffic, Self::Connections, Self::Logs];

    /// Path segment under the controller root.
    pub fn path(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Traffic => "traffic",
            Self::Connections => "connections",
            Self::Logs => "logs",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Lifecycle of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Streaming,
    Disconnected,
}

// ── StreamEvent ──────────────────────────────────────────────────────

/// A decoded push message, or a channel lifecycle notification.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    Memory(Memory),
    Traffic(Traffic),
    Connections(ConnectionsSnapshot),
    Log(LogLine),
    ChannelState {
        channel: Channel,
        state: ChannelState,
    },
}

// ── Configuration ────────────────────────────────────────────────────

/// Fixed reconnect delays. The daemon is normally local, so there is no
/// exponential growth.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Wait after a live stream drops. Default: 1s.
    pub after_disconnect: Duration,
    /// Wait after a connection attempt fails. Default: 2s.
    pub after_failure: Duration,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            after_disconnect: Duration::from_secs(1),
            after_failure: Duration::from_secs(2),
        }
    }
}

/// Everything needed to open the four subscriptions.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Controller root as configured (`http://` or `https://`).
    pub base_url: Url,
    pub secret: Option<SecretString>,
    /// Minimum level requested from the `logs` channel. Defaults to
    /// `debug` so level switching can happen client-side.
    pub log_level: String,
    pub reconnect: ReconnectConfig,
}

impl StreamConfig {
    pub fn new(base_url: Url, secret: Option<SecretString>) -> Self {
        Self {
            base_url,
            secret,
            log_level: "debug".into(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// WebSocket URL for one channel: scheme swapped to `ws`/`wss`, the
    /// channel appended to the path, auth passed as `token`.
    pub fn channel_url(&self, channel: Channel) -> Result<Url, Error> {
        let mut url = self.base_url.clone();

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(Error::InvalidConfig(format!(
                    "unsupported controller scheme: {other}"
                )));
            }
        };
        url.set_scheme(scheme)
            .map_err(|()| Error::InvalidConfig(format!("cannot use {scheme} for {url}")))?;

        url.path_segments_mut()
            .map_err(|()| Error::InvalidConfig(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .push(channel.path());

        url.set_query(None);
        {
            let mut query = url.query_pairs_mut();
            if channel == Channel::Logs {
                query.append_pair("level", &self.log_level);
            }
            if let Some(token) = self
                .secret
                .as_ref()
                .map(ExposeSecret::expose_secret)
                .filter(|s| !s.is_empty())
            {
                query.append_pair("token", token);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }
}

// ── StreamClient ─────────────────────────────────────────────────────

struct Run {
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

/// Owner of the four channel tasks.
///
/// `E` is the caller's queue item; anything that can be built from a
/// [`StreamEvent`] works, so the streams can share one queue with other
/// producers.
pub struct StreamClient<E> {
    config: StreamConfig,
    event_tx: mpsc::Sender<E>,
    run: Mutex<Option<Run>>,
}

impl<E> StreamClient<E>
where
    E: From<StreamEvent> + Send + 'static,
{
    pub fn new(config: StreamConfig, event_tx: mpsc::Sender<E>) -> Self {
        Self {
            config,
            event_tx,
            run: Mutex::new(None),
        }
    }

    /// Spawn the channel tasks. No-op if they are already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), Error> {
        let mut run = self.run.lock().unwrap_or_else(PoisonError::into_inner);
        if run.as_ref().is_some_and(|r| r.tasks.iter().any(|t| !t.is_finished())) {
            return Ok(());
        }

        let urls = Channel::ALL
            .iter()
            .map(|&ch| self.config.channel_url(ch).map(|url| (ch, url)))
            .collect::<Result<Vec<_>, _>>()?;

        let cancel = CancellationToken::new();
        let tasks = urls
            .into_iter()
            .map(|(channel, url)| {
                let tx = self.event_tx.clone();
                let reconnect = self.config.reconnect.clone();
                let cancel = cancel.child_token();
                tokio::spawn(channel_loop(channel, url, tx, reconnect, cancel))
            })
            .collect();

        tracing::info!("streams started");
        *run = Some(Run { cancel, tasks });
        Ok(())
    }

    /// Close all four sockets and halt their reconnect loops.
    pub fn stop(&self) {
        let taken = self
            .run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(run) = taken {
            run.cancel.cancel();
            for task in run.tasks {
                task.abort();
            }
            tracing::info!("streams stopped");
        }
    }

    /// Whether any channel task is alive.
    pub fn is_running(&self) -> bool {
        self.run
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|r| r.tasks.iter().any(|t| !t.is_finished()))
    }
}

impl<E> Drop for StreamClient<E> {
    fn drop(&mut self) {
        if let Some(run) = self
            .run
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            run.cancel.cancel();
        }
    }
}

// ── Per-channel reconnect loop ───────────────────────────────────────

/// `Disconnected -> Connecting -> Streaming -> Disconnected`, forever,
/// until cancelled or the queue's receiver is gone.
async fn channel_loop<E>(
    channel: Channel,
    url: Url,
    event_tx: mpsc::Sender<E>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) where
    E: From<StreamEvent> + Send + 'static,
{
    loop {
        forward(&event_tx, StreamEvent::ChannelState {
            channel,
            state: ChannelState::Connecting,
        });

        let delay = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(channel, &url, &event_tx) => match result {
                Ok(()) => {
                    tracing::info!(%channel, "stream disconnected");
                    reconnect.after_disconnect
                }
                Err(e) => {
                    tracing::warn!(%channel, error = %e, "stream connect failed");
                    reconnect.after_failure
                }
            },
        };

        if event_tx.is_closed() {
            break;
        }
        forward(&event_tx, StreamEvent::ChannelState {
            channel,
            state: ChannelState::Disconnected,
        });

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }
    }

    tracing::debug!(%channel, "stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Connect once and read until the stream drops.
///
/// `Err` means the connection was never established. Once streaming, any
/// end (close frame, read error, EOF) is a disconnect and returns `Ok`.
async fn connect_and_read<E>(
    channel: Channel,
    url: &Url,
    event_tx: &mpsc::Sender<E>,
) -> Result<(), Error>
where
    E: From<StreamEvent>,
{
    tracing::debug!(%channel, "connecting");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    tracing::info!(%channel, "stream connected");
    forward(event_tx, StreamEvent::ChannelState {
        channel,
        state: ChannelState::Streaming,
    });

    let (_write, mut read) = ws_stream.split();

    while let Some(frame) = read.next().await {
        match frame {
            Ok(tungstenite::Message::Text(text)) => match decode(channel, text.as_str()) {
                Ok(event) => {
                    if !forward(event_tx, event) {
                        return Ok(());
                    }
                }
                Err(e) => tracing::debug!(%channel, error = %e, "undecodable frame"),
            },
            Ok(tungstenite::Message::Close(frame)) => {
                if let Some(ref cf) = frame {
                    tracing::info!(%channel, code = %cf.code, reason = %cf.reason, "close frame");
                }
                return Ok(());
            }
            Ok(_) => {
                // Ping/Pong/Binary -- tungstenite answers pings itself
            }
            Err(e) => {
                tracing::warn!(%channel, error = %e, "stream read error");
                return Ok(());
            }
        }
    }

    Ok(())
}

// ── Decoding & forwarding ────────────────────────────────────────────

/// Decode one text frame according to the channel it arrived on.
pub fn decode(channel: Channel, text: &str) -> Result<StreamEvent, serde_json::Error> {
    Ok(match channel {
        Channel::Memory => StreamEvent::Memory(serde_json::from_str(text)?),
        Channel::Traffic => StreamEvent::Traffic(serde_json::from_str(text)?),
        Channel::Connections => StreamEvent::Connections(serde_json::from_str(text)?),
        Channel::Logs => StreamEvent::Log(serde_json::from_str(text)?),
    })
}

/// Non-blocking enqueue. A full queue drops the event; returns `false`
/// only when the receiver has gone away.
fn forward<E: From<StreamEvent>>(event_tx: &mpsc::Sender<E>, event: StreamEvent) -> bool {
    match event_tx.try_send(E::from(event)) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::trace!("event queue full, dropping stream event");
            true
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

// ── Tests ────────────────────────────────────────────────────────────
