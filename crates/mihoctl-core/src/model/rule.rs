// ── Rule domain type ──

use serde::Serialize;

/// One routing rule. `index` is its match priority (0 = first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub index: usize,
    pub kind: String,
    pub payload: String,
    pub target: String,
    /// Entry count for rule-set rules.
    pub size: Option<u64>,
}

impl Rule {
    /// `type payload target`, the text filters match against.
    pub fn haystack(&self) -> String {
        format!("{} {} {}", self.kind, self.payload, self.target)
    }
}
