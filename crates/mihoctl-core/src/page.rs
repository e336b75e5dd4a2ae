//! Page identifiers, navigable by number keys and Tab.

use std::fmt;

/// Identifies each top-level page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Page {
    #[default]
    Nodes, // 1
    Connections, // 2
    Logs,        // 3
    Rules,       // 4
    Settings,    // 5
    Help,        // 6
}

impl Page {
    /// All pages in tab-bar order.
    pub const ALL: [Page; 6] = [
        Self::Nodes,
        Self::Connections,
        Self::Logs,
        Self::Rules,
        Self::Settings,
        Self::Help,
    ];

    /// Numeric key (1-6) for this page.
    pub fn number(self) -> u8 {
        match self {
            Self::Nodes => 1,
            Self::Connections => 2,
            Self::Logs => 3,
            Self::Rules => 4,
            Self::Settings => 5,
            Self::Help => 6,
        }
    }

    /// Page from a numeric key (1-6). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.number() == n)
    }

    /// Next page in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous page in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&p| p == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Whether this page renders live stream data.
    pub fn wants_streams(self) -> bool {
        matches!(self, Self::Connections | Self::Logs)
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Nodes => "Nodes",
            Self::Connections => "Connections",
            Self::Logs => "Logs",
            Self::Rules => "Rules",
            Self::Settings => "Settings",
            Self::Help => "Help",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_wraps() {
        assert_eq!(Page::Help.next(), Page::Nodes);
        assert_eq!(Page::Nodes.prev(), Page::Help);
        assert_eq!(Page::from_number(4), Some(Page::Rules));
        assert_eq!(Page::from_number(7), None);
    }
}
