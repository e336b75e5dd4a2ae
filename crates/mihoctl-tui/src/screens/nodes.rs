//! Nodes page: proxy groups on the left, the current group's members and
//! their latency on the right, test failures underneath.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Row, Table, TableState},
};

use mihoctl_core::state::NodesView;
use mihoctl_core::{LatencyOutcome, ProxyGroup};

use super::{panel, placeholder};
use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, view: &NodesView) {
    let failure_rows = match (view.failures.is_empty(), view.failures_expanded) {
        (true, _) => 0,
        (false, false) => 1,
        (false, true) => u16::try_from(view.failures.len()).unwrap_or(u16::MAX).min(8) + 3,
    };
    let [body, failures] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(failure_rows)]).areas(area);
    let [groups_area, members_area] =
        Layout::horizontal([Constraint::Percentage(30), Constraint::Percentage(70)]).areas(body);

    render_groups(frame, groups_area, view);
    render_members(frame, members_area, view);
    if failure_rows > 0 {
        render_failures(frame, failures, view);
    }
}

fn render_groups(frame: &mut Frame, area: Rect, view: &NodesView) {
    let items: Vec<ListItem> = view
        .listing
        .groups
        .values()
        .map(|g| {
            ListItem::new(Line::from(vec![
                Span::styled(g.name.clone(), theme::table_row()),
                Span::styled(format!("  {}", g.kind), theme::key_hint()),
            ]))
        })
        .collect();

    let title = format!(" Groups ({}) ", items.len());
    let list = List::new(items)
        .block(panel(title, false))
        .highlight_style(theme::table_selected())
        .highlight_symbol("▸ ");

    let mut state = ListState::default();
    if !view.listing.groups.is_empty() {
        state.select(Some(view.group_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn latency_span(view: &NodesView, name: &str) -> Span<'static> {
    if view.testing.contains(name) {
        return Span::styled("testing…", theme::key_hint());
    }
    match view.node(name).and_then(|n| n.latest()) {
        Some(outcome @ LatencyOutcome::Millis(_)) => Span::styled(
            outcome.to_string(),
            Style::default().fg(theme::latency_color(outcome)),
        ),
        Some(outcome @ LatencyOutcome::Failed(_)) => Span::styled(
            "failed",
            Style::default().fg(theme::latency_color(outcome)),
        ),
        None => Span::styled("-", theme::key_hint()),
    }
}

fn member_title(group: &ProxyGroup) -> String {
    let current = group.selected.as_deref().unwrap_or("-");
    if group.is_selectable() {
        format!(" {} → {current} ", group.name)
    } else {
        format!(" {} → {current} ({}, automatic) ", group.name, group.kind)
    }
}

fn render_members(frame: &mut Frame, area: Rect, view: &NodesView) {
    let Some(group) = view.current_group() else {
        let text = placeholder(view.loaded, "No proxy groups");
        frame.render_widget(
            Paragraph::new(text)
                .style(theme::key_hint())
                .block(panel(" Members ".into(), true)),
            area,
        );
        return;
    };

    let rows: Vec<Row> = group
        .members
        .iter()
        .map(|name| {
            let node = view.node(name);
            let mark = if group.is_selected(name) { "✓" } else { "" };
            Row::new(vec![
                Line::from(Span::styled(mark, Style::default().fg(theme::SUCCESS_GREEN))),
                Line::from(name.clone()),
                Line::from(node.map(|n| n.kind.clone()).unwrap_or_default()),
                Line::from(if node.is_some_and(|n| n.udp) { "udp" } else { "" }),
                Line::from(latency_span(view, name)),
            ])
            .style(theme::table_row())
        })
        .collect();

    let header = Row::new(["", "Name", "Type", "UDP", "Latency"]).style(theme::table_header());
    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Fill(3),
            Constraint::Fill(1),
            Constraint::Length(4),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(panel(member_title(group), true))
    .row_highlight_style(theme::table_selected());

    let mut state = TableState::default();
    if !group.members.is_empty() {
        state.select(Some(view.member_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_failures(frame: &mut Frame, area: Rect, view: &NodesView) {
    let Some(summary) = view.failure_summary() else {
        return;
    };

    if !view.failures_expanded {
        let line = Line::from(vec![
            Span::styled(format!(" ✗ {summary}"), theme::error_text()),
            Span::styled("   f details", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let lines: Vec<Line> = view
        .failures
        .iter()
        .map(|f| {
            Line::from(vec![
                Span::styled(format!(" {}", f.node), theme::table_row()),
                Span::styled(format!("  {}", f.reason), theme::key_hint()),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(panel(format!(" ✗ {summary} (f to hide) "), false)),
        area,
    );
}
