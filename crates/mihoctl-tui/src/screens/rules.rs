//! Rules page: the routing table in match order.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::{Paragraph, Row, Table, TableState},
};

use mihoctl_core::state::RulesView;

use super::{filter_line, panel, placeholder};
use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, view: &RulesView) {
    let [filter, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
    frame.render_widget(Paragraph::new(filter_line(&view.input)), filter);

    let visible = view.visible();
    let rows: Vec<Row> = visible
        .iter()
        .map(|r| {
            Row::new(vec![
                r.index.to_string(),
                r.kind.clone(),
                r.payload.clone(),
                r.target.clone(),
                r.size.map(|s| s.to_string()).unwrap_or_default(),
            ])
            .style(theme::table_row())
        })
        .collect();

    let title = if view.rules.is_empty() {
        format!(" {} ", placeholder(view.loaded, "No rules"))
    } else {
        format!(" Rules {}/{} ", visible.len(), view.rules.len())
    };
    let header = Row::new(["#", "Type", "Payload", "Proxy", "Size"]).style(theme::table_header());
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Length(16),
            Constraint::Fill(3),
            Constraint::Fill(1),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(panel(title, true))
    .row_highlight_style(theme::table_selected());

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(table, body, &mut state);
}
