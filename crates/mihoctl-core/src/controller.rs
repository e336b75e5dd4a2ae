// ── Controller ──
//
// Runs control-API calls and owns the stream client. Every call the event
// loop requests is spawned as its own task and completes by enqueuing an
// `Event` on the shared inbound queue; no task touches `ViewState`.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mihoctl_api::stream::EVENT_QUEUE_CAPACITY;
use mihoctl_api::{GeoClient, MihomoClient, StreamClient, StreamConfig, TransportConfig};

use crate::command::Command;
use crate::config::{ClientConfig, ProbeSettings};
use crate::convert::rules_from_wire;
use crate::error::CoreError;
use crate::event::Event;
use crate::model::{ConnectionSnapshot, IpInfo, LatencyOutcome, ProxyGroup, ProxyListing, Rule};

/// Reason recorded for a node the bulk probe did not report.
const NO_BULK_RESULT: &str = "no response within timeout";

// ── Controller ───────────────────────────────────────────────────────

/// Entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. The async methods are
/// plain request/response calls usable from the CLI; [`execute`](Self::execute)
/// is the fire-and-forget path the TUI drives.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    client: MihomoClient,
    geo: Option<GeoClient>,
    streams: StreamClient<Event>,
    /// Probe URL and timeout; swapped live when settings change.
    probe: ArcSwap<ProbeSettings>,
    event_tx: mpsc::Sender<Event>,
    cancel: CancellationToken,
}

impl Controller {
    /// Build a controller and the receiving end of its event queue.
    pub fn new(config: ClientConfig) -> Result<(Self, mpsc::Receiver<Event>), CoreError> {
        let geo = match GeoClient::new() {
            Ok(geo) => Some(geo),
            Err(e) => {
                warn!(error = %e, "geo lookup disabled");
                None
            }
        };
        Self::with_geo(config, geo)
    }

    /// Like [`new`](Self::new) with an explicit geo client (or none).
    pub fn with_geo(
        config: ClientConfig,
        geo: Option<GeoClient>,
    ) -> Result<(Self, mpsc::Receiver<Event>), CoreError> {
        let transport = TransportConfig {
            timeout: config.timeout,
            secret: config.secret.clone(),
        };
        let client = MihomoClient::new(config.api_address.clone(), &transport)?;

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let streams = StreamClient::new(
            StreamConfig::new(config.api_address.clone(), config.secret.clone()),
            event_tx.clone(),
        );
        let probe = ProbeSettings {
            test_url: config.test_url.clone(),
            timeout_ms: config.timeout_ms(),
        };

        let inner = ControllerInner {
            client,
            geo,
            streams,
            probe: ArcSwap::from_pointee(probe),
            event_tx,
            cancel: CancellationToken::new(),
        };
        Ok((
            Self {
                inner: Arc::new(inner),
            },
            event_rx,
        ))
    }

    pub fn client(&self) -> &MihomoClient {
        &self.inner.client
    }

    pub fn probe_settings(&self) -> Arc<ProbeSettings> {
        self.inner.probe.load_full()
    }

    /// Replace the probe URL and timeout for subsequent tests.
    pub fn update_probe(&self, settings: ProbeSettings) {
        debug!(url = %settings.test_url, timeout_ms = settings.timeout_ms, "probe settings updated");
        self.inner.probe.store(Arc::new(settings));
    }

    // ── Proxies ──────────────────────────────────────────────────────

    /// Full listing: node table plus the groups derived from it.
    pub async fn proxies(&self) -> Result<ProxyListing, CoreError> {
        let raw = self.inner.client.list_proxies().await?;
        Ok(ProxyListing::from_wire(raw))
    }

    pub async fn groups(&self) -> Result<BTreeMap<String, ProxyGroup>, CoreError> {
        Ok(self.proxies().await?.groups)
    }

    /// Switch `group` to `proxy`, then re-list so the group's selection
    /// and the node table come back from the same response.
    pub async fn select_proxy(&self, group: &str, proxy: &str) -> Result<ProxyListing, CoreError> {
        self.inner.client.select_proxy(group, proxy).await?;
        self.proxies().await
    }

    /// Probe one node. Failures are outcomes, never errors.
    pub async fn test_latency(&self, node: &str, probe: &ProbeSettings) -> LatencyOutcome {
        match self
            .inner
            .client
            .test_latency(node, &probe.test_url, probe.timeout_ms)
            .await
        {
            Ok(0) => LatencyOutcome::Failed("no response".into()),
            Ok(ms) => LatencyOutcome::Millis(ms),
            Err(e) => {
                debug!(node, error = %e, "latency probe failed");
                LatencyOutcome::Failed(probe_failure(e))
            }
        }
    }

    /// Probe every node in `nodes` (members of `group`).
    ///
    /// Uses the daemon's bulk endpoint when it has one; a 404 falls back
    /// to concurrent single probes. Results come back in completion
    /// order, one per requested node.
    pub async fn test_group(
        &self,
        group: &str,
        nodes: &[String],
        probe: &ProbeSettings,
    ) -> Vec<(String, LatencyOutcome)> {
        if let Some(results) = self.bulk_test(group, nodes, probe).await {
            return results;
        }
        let mut pending: FuturesUnordered<_> = nodes
            .iter()
            .map(|node| async move { (node.clone(), self.test_latency(node, probe).await) })
            .collect();
        let mut results = Vec::with_capacity(nodes.len());
        while let Some(result) = pending.next().await {
            results.push(result);
        }
        results
    }

    /// `None` when the daemon has no bulk endpoint.
    async fn bulk_test(
        &self,
        group: &str,
        nodes: &[String],
        probe: &ProbeSettings,
    ) -> Option<Vec<(String, LatencyOutcome)>> {
        match self
            .inner
            .client
            .test_group_latency(group, &probe.test_url, probe.timeout_ms)
            .await
        {
            Ok(delays) => Some(
                nodes
                    .iter()
                    .map(|node| {
                        let outcome = match delays.get(node) {
                            Some(&ms) if ms > 0 => LatencyOutcome::Millis(ms),
                            _ => LatencyOutcome::Failed(NO_BULK_RESULT.into()),
                        };
                        (node.clone(), outcome)
                    })
                    .collect(),
            ),
            Err(e) if e.is_not_found() => {
                debug!(group, "bulk delay endpoint unavailable, probing nodes one by one");
                None
            }
            Err(e) => {
                let reason = probe_failure(e);
                Some(
                    nodes
                        .iter()
                        .map(|node| (node.clone(), LatencyOutcome::Failed(reason.clone())))
                        .collect(),
                )
            }
        }
    }

    // ── Connections and rules ────────────────────────────────────────

    pub async fn connections(&self) -> Result<ConnectionSnapshot, CoreError> {
        Ok(self.inner.client.list_connections().await?.into())
    }

    pub async fn close_connection(&self, id: &str) -> Result<(), CoreError> {
        Ok(self.inner.client.close_connection(id).await?)
    }

    pub async fn close_all_connections(&self) -> Result<(), CoreError> {
        Ok(self.inner.client.close_all_connections().await?)
    }

    pub async fn rules(&self) -> Result<Vec<Rule>, CoreError> {
        Ok(rules_from_wire(self.inner.client.list_rules().await?))
    }

    /// Daemon version string, tagged when it is a Meta build.
    pub async fn version(&self) -> Result<String, CoreError> {
        let v = self.inner.client.version().await?;
        Ok(if v.meta {
            format!("{} (Meta)", v.version)
        } else {
            v.version
        })
    }

    /// Best-effort geolocation; any failure is `None`.
    pub async fn lookup_geo(&self, ip: &str) -> Option<IpInfo> {
        let geo = self.inner.geo.as_ref()?;
        match geo.lookup(ip).await {
            Ok(info) => Some(info),
            Err(e) => {
                debug!(ip, error = %e, "geo lookup failed");
                None
            }
        }
    }

    // ── Streams ──────────────────────────────────────────────────────

    /// Start the four push channels. Idempotent.
    pub fn start_streams(&self) -> Result<(), CoreError> {
        Ok(self.inner.streams.start()?)
    }

    pub fn stop_streams(&self) {
        self.inner.streams.stop();
    }

    pub fn streams_running(&self) -> bool {
        self.inner.streams.is_running()
    }

    // ── Command execution ────────────────────────────────────────────

    /// Run a command in the background. Its completion (or failure)
    /// arrives later as an [`Event`] on the queue returned by `new`.
    ///
    /// `SaveSetting` and `Quit` belong to the shell and are ignored here.
    pub fn execute(&self, cmd: Command) {
        match cmd {
            Command::RefreshProxies => self.spawn_call(|c| async move {
                c.proxies().await.map(Event::ProxiesLoaded)
            }),
            Command::SelectProxy { group, proxy } => self.spawn_call(|c| async move {
                let listing = c.select_proxy(&group, &proxy).await?;
                Ok(Event::ProxySelected {
                    group,
                    proxy,
                    listing,
                })
            }),
            Command::TestLatency { node } => self.spawn_probe(node),
            Command::TestGroup { group, nodes } => self.spawn_group_test(group, nodes),
            Command::FetchConnections => self.spawn_call(|c| async move {
                c.connections().await.map(Event::ConnectionsLoaded)
            }),
            Command::CloseConnection { id } => self.spawn_call(|c| async move {
                c.close_connection(&id).await?;
                Ok(Event::ConnectionClosed { id })
            }),
            Command::CloseAllConnections => self.spawn_call(|c| async move {
                c.close_all_connections().await?;
                Ok(Event::AllConnectionsClosed)
            }),
            Command::FetchRules => self.spawn_call(|c| async move {
                c.rules().await.map(Event::RulesLoaded)
            }),
            Command::LookupGeo { ip } => self.spawn_call(|c| async move {
                let info = c.lookup_geo(&ip).await;
                Ok(Event::GeoResolved { ip, info })
            }),
            Command::FetchVersion => self.spawn_call(|c| async move {
                c.version().await.map(Event::VersionLoaded)
            }),
            Command::StartStreams => {
                if let Err(e) = self.start_streams() {
                    self.spawn_emit(Event::Failed(e.to_string()));
                }
            }
            Command::StopStreams => self.stop_streams(),
            Command::SaveSetting { .. } | Command::Quit => {}
        }
    }

    /// Stop streams and abandon in-flight calls.
    pub fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.streams.stop();
    }

    // ── Task plumbing ────────────────────────────────────────────────

    /// Spawn one call; its result becomes one event, errors `Event::Failed`.
    fn spawn_call<F, Fut>(&self, call: F)
    where
        F: FnOnce(Controller) -> Fut,
        Fut: Future<Output = Result<Event, CoreError>> + Send + 'static,
    {
        let fut = call(self.clone());
        let tx = self.inner.event_tx.clone();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            let event = tokio::select! {
                () = cancel.cancelled() => return,
                result = fut => result.unwrap_or_else(|e| Event::Failed(e.to_string())),
            };
            emit(&tx, event).await;
        });
    }

    fn spawn_emit(&self, event: Event) {
        let tx = self.inner.event_tx.clone();
        tokio::spawn(async move { emit(&tx, event).await });
    }

    fn spawn_probe(&self, node: String) {
        let probe = self.probe_settings();
        self.spawn_call(|c| async move {
            let outcome = c.test_latency(&node, &probe).await;
            Ok(Event::LatencyTested { node, outcome })
        });
    }

    /// Bulk first; on fallback every node gets its own task so results
    /// land as each probe finishes.
    fn spawn_group_test(&self, group: String, nodes: Vec<String>) {
        let this = self.clone();
        let probe = self.probe_settings();
        let tx = self.inner.event_tx.clone();
        let cancel = self.inner.cancel.clone();
        tokio::spawn(async move {
            let bulk = tokio::select! {
                () = cancel.cancelled() => return,
                bulk = this.bulk_test(&group, &nodes, &probe) => bulk,
            };
            match bulk {
                Some(results) => {
                    for (node, outcome) in results {
                        emit(&tx, Event::LatencyTested { node, outcome }).await;
                    }
                }
                None => {
                    for node in nodes {
                        this.spawn_probe(node);
                    }
                }
            }
        });
    }
}

/// Deliver a control result. Unlike stream pushes these wait for room
/// rather than drop, so an in-flight test always resolves.
async fn emit(tx: &mpsc::Sender<Event>, event: Event) {
    if tx.send(event).await.is_err() {
        debug!("event queue closed, dropping result");
    }
}

/// Text recorded against a node whose probe failed. The daemon's own
/// message (e.g. "Timeout") is more useful than the status line wrapper.
fn probe_failure(err: mihoctl_api::Error) -> String {
    match err {
        mihoctl_api::Error::Api { message, .. } if !message.is_empty() => message,
        other => CoreError::from(other).to_string(),
    }
}
