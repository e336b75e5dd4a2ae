//! Help page: the key map.

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::panel;
use crate::theme;

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("1-6", "Jump to page"),
            ("Tab/S-Tab", "Next / previous page"),
            ("r", "Refresh current page"),
            ("q Ctrl-C", "Quit"),
        ],
    ),
    (
        "Nodes",
        &[
            ("h/l ←/→", "Previous / next group"),
            ("j/k ↑/↓", "Move"),
            ("Enter", "Select node"),
            ("t", "Test selected node"),
            ("a", "Test every node in the group"),
            ("f", "Show / hide test failures"),
        ],
    ),
    (
        "Connections",
        &[
            ("/", "Filter"),
            ("Enter", "Details and geolocation"),
            ("x / X", "Close selected / close all"),
            ("c", "Active / closed history"),
            ("Esc", "Close detail, then clear filter"),
        ],
    ),
    (
        "Logs and Rules",
        &[
            ("/", "Filter"),
            ("←/→", "Minimum log level"),
            ("h/l", "Scroll log lines sideways"),
            ("Home/End", "Newest / oldest"),
        ],
    ),
    ("Settings", &[("Enter", "Edit, then save"), ("Esc", "Cancel edit")]),
];

pub fn render(frame: &mut Frame, area: Rect) {
    let mut lines = Vec::new();
    for (title, keys) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {title}"),
            Style::default().fg(theme::NEON_CYAN),
        )));
        for (key, what) in *keys {
            lines.push(Line::from(vec![
                Span::styled(format!("    {key:<12}"), theme::key_hint_key()),
                Span::styled(*what, theme::key_hint()),
            ]));
        }
    }
    frame.render_widget(
        Paragraph::new(lines).block(panel(" Keyboard Shortcuts ".into(), true)),
        area,
    );
}
