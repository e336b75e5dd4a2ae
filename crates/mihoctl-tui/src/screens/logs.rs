//! Logs page: the daemon's log stream, newest first, filtered by minimum
//! level and free text.

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
};

use mihoctl_core::state::LogsView;
use mihoctl_core::{LogEntry, LogLevel};

use super::{filter_line, panel};
use crate::theme;

const LEVELS: [LogLevel; 4] = [
    LogLevel::Debug,
    LogLevel::Info,
    LogLevel::Warning,
    LogLevel::Error,
];

pub fn render(frame: &mut Frame, area: Rect, view: &LogsView) {
    let [levels, filter, list] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    frame.render_widget(Paragraph::new(level_line(view.level)), levels);
    frame.render_widget(Paragraph::new(filter_line(&view.input)), filter);

    let visible = view.visible();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|e| ListItem::new(entry_line(e, view.h_scroll)))
        .collect();
    let title = format!(" Logs {}/{} ", visible.len(), view.entries.len());
    let list_widget = List::new(items)
        .block(panel(title, true))
        .highlight_style(theme::table_selected());

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(list_widget, list, &mut state);
}

/// Level selector: levels at or above the minimum are lit.
fn level_line(min: LogLevel) -> Line<'static> {
    let mut spans = vec![Span::styled(" level ", theme::key_hint())];
    for level in LEVELS {
        let style = if level >= min {
            Style::default().fg(theme::log_level_color(level))
        } else {
            theme::key_hint()
        };
        let text = if level == min {
            format!("[{level}]")
        } else {
            format!(" {level} ")
        };
        spans.push(Span::styled(text, style));
    }
    spans.push(Span::styled("   ←/→ change  h/l scroll", theme::key_hint()));
    Line::from(spans)
}

fn entry_line(entry: &LogEntry, h_scroll: usize) -> Line<'static> {
    let payload: String = entry.payload.chars().skip(h_scroll).collect();
    let level: &'static str = entry.level.into();
    Line::from(vec![
        Span::styled(
            entry
                .received_at
                .with_timezone(&Local)
                .format("%H:%M:%S ")
                .to_string(),
            theme::key_hint(),
        ),
        Span::styled(
            format!("{:<8}", level.to_uppercase()),
            Style::default().fg(theme::log_level_color(entry.level)),
        ),
        Span::styled(payload, theme::table_row()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn entry_line_skips_scrolled_characters() {
        let entry = LogEntry {
            level: LogLevel::Info,
            payload: "héllo world".into(),
            received_at: chrono::Utc::now(),
        };
        let line = text(&entry_line(&entry, 6));
        assert!(line.ends_with("world"), "{line}");
        assert!(!line.contains("héllo"));
    }

    #[test]
    fn level_line_brackets_the_minimum() {
        let line = text(&level_line(LogLevel::Warning));
        insta::assert_snapshot!(line.trim(), @"level  debug  info [warning] error    ←/→ change  h/l scroll");
    }
}
