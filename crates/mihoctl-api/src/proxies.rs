// Proxy and group endpoints
//
// Groups are derived from the proxies listing: any entry with a non-empty
// `all` list is a group. The daemon has no separate group listing.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::client::MihomoClient;
use crate::error::Error;
use crate::models::{DelayResponse, Proxy, ProxiesResponse, SelectRequest, Version};

/// Slack added on top of a probe timeout so the daemon answers before the
/// HTTP deadline fires.
const PROBE_GRACE: Duration = Duration::from_secs(1);

impl MihomoClient {
    /// List every proxy entry known to the daemon, keyed by name.
    ///
    /// `GET /proxies`
    pub async fn list_proxies(&self) -> Result<BTreeMap<String, Proxy>, Error> {
        let url = self.url(&["proxies"])?;
        let resp: ProxiesResponse = self.get(url).await?;
        Ok(resp.proxies)
    }

    /// List the entries that expose members, i.e. selectable groups.
    pub async fn list_groups(&self) -> Result<BTreeMap<String, Proxy>, Error> {
        Ok(groups_of(self.list_proxies().await?))
    }

    /// Fetch one proxy or group by name.
    ///
    /// `GET /proxies/{name}`
    pub async fn get_proxy(&self, name: &str) -> Result<Proxy, Error> {
        let url = self.url(&["proxies", name])?;
        self.get(url).await
    }

    /// Point `group` at `proxy`. Does not return the new state; callers
    /// re-list to observe it.
    ///
    /// An unknown group is [`Error::NotFound`]. A `proxy` that is not a
    /// member is rejected by the daemon with 400 and surfaces as
    /// [`Error::Api`] carrying its message.
    ///
    /// `PUT /proxies/{group}` with `{"name": proxy}`
    pub async fn select_proxy(&self, group: &str, proxy: &str) -> Result<(), Error> {
        let url = self.url(&["proxies", group])?;
        debug!(group, proxy, "selecting proxy");
        self.put(url, &SelectRequest { name: proxy }).await
    }

    /// Probe one node's latency through the daemon.
    ///
    /// `GET /proxies/{name}/delay?url=..&timeout=..`
    pub async fn test_latency(
        &self,
        name: &str,
        probe_url: &str,
        timeout_ms: u64,
    ) -> Result<u32, Error> {
        let mut url = self.url(&["proxies", name, "delay"])?;
        url.query_pairs_mut()
            .append_pair("url", probe_url)
            .append_pair("timeout", &timeout_ms.to_string());

        let resp: DelayResponse = self
            .get_with_timeout(url, Duration::from_millis(timeout_ms) + PROBE_GRACE)
            .await?;
        Ok(resp.delay)
    }

    /// Probe every member of a group in one call. Returns member → delay
    /// for the members that answered.
    ///
    /// `GET /group/{name}/delay?url=..&timeout=..`. Daemons without bulk
    /// support answer 404.
    pub async fn test_group_latency(
        &self,
        group: &str,
        probe_url: &str,
        timeout_ms: u64,
    ) -> Result<BTreeMap<String, u32>, Error> {
        let mut url = self.url(&["group", group, "delay"])?;
        url.query_pairs_mut()
            .append_pair("url", probe_url)
            .append_pair("timeout", &timeout_ms.to_string());

        self.get_with_timeout(url, Duration::from_millis(timeout_ms) + PROBE_GRACE)
            .await
    }

    /// Daemon version.
    ///
    /// `GET /version`
    pub async fn version(&self) -> Result<Version, Error> {
        let url = self.url(&["version"])?;
        self.get(url).await
    }
}

/// Keep only entries with members.
pub fn groups_of(proxies: BTreeMap<String, Proxy>) -> BTreeMap<String, Proxy> {
    proxies.into_iter().filter(|(_, p)| p.is_group()).collect()
}
