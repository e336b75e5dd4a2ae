// ── Commands ──
//
// Side effects requested by key dispatch or by reconciliation. The shell
// hands control calls to `Controller::execute`; `SaveSetting` and `Quit`
// are handled by the shell itself.

use crate::model::SettingKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RefreshProxies,
    SelectProxy { group: String, proxy: String },
    TestLatency { node: String },
    /// Probe every listed member of `group`.
    TestGroup { group: String, nodes: Vec<String> },
    FetchConnections,
    CloseConnection { id: String },
    CloseAllConnections,
    FetchRules,
    LookupGeo { ip: String },
    FetchVersion,
    StartStreams,
    StopStreams,
    SaveSetting { key: SettingKey, value: String },
    Quit,
}
