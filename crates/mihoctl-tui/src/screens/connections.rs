//! Connections page: traffic, memory and connection-count charts above a
//! live (or closed-history) connection table, with a detail popup.

use chrono::Utc;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Row, Table, TableState, Wrap},
};

use mihoctl_core::input::InputMode;
use mihoctl_core::state::{ConnectionsView, DetailState, GeoState};
use mihoctl_core::{Connection, IpInfo, ViewState, format_age};

use super::{filter_line, panel, placeholder};
use crate::theme;
use crate::widgets::{bytes_fmt, chart};

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let [charts, summary, filter, table] = Layout::vertical([
        Constraint::Length(9),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
    ])
    .areas(area);

    render_charts(frame, charts, state);
    render_summary(frame, summary, &state.connections);
    frame.render_widget(Paragraph::new(filter_line(&state.connections.input)), filter);
    render_table(frame, table, &state.connections);

    if state.connections.input.mode() == InputMode::DetailView {
        if let Some(detail) = &state.connections.detail {
            render_detail(frame, area, detail);
        }
    }
}

fn render_charts(frame: &mut Frame, area: Rect, state: &ViewState) {
    let [traffic, memory, count] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ])
    .areas(area);

    let charts = &state.charts;
    let up = charts.upload.last().unwrap_or(0);
    let down = charts.download.last().unwrap_or(0);
    chart::render(
        frame,
        traffic,
        &format!(
            "Traffic ↑ {}  ↓ {}",
            bytes_fmt::fmt_rate(up),
            bytes_fmt::fmt_rate(down)
        ),
        &[
            chart::Line { label: "up", color: theme::UPLOAD, series: &charts.upload },
            chart::Line { label: "down", color: theme::DOWNLOAD, series: &charts.download },
        ],
        bytes_fmt::fmt_axis,
    );
    chart::render(
        frame,
        memory,
        &format!("Memory {}", bytes_fmt::fmt_bytes(charts.memory.last().unwrap_or(0))),
        &[chart::Line { label: "inuse", color: theme::LIGHT_BLUE, series: &charts.memory }],
        bytes_fmt::fmt_axis,
    );
    chart::render(
        frame,
        count,
        &format!("Connections {}", charts.connections.last().unwrap_or(0)),
        &[chart::Line {
            label: "count",
            color: theme::ELECTRIC_PURPLE,
            series: &charts.connections,
        }],
        bytes_fmt::fmt_axis,
    );
}

fn render_summary(frame: &mut Frame, area: Rect, view: &ConnectionsView) {
    let which = if view.show_closed {
        format!(" {} closed", view.closed.len())
    } else {
        format!(" {} active", view.active.len())
    };
    let line = Line::from(vec![
        Span::styled(which, theme::title_style()),
        Span::styled(
            format!(
                "   {}",
                bytes_fmt::fmt_up_down(view.upload_total, view.download_total)
            ),
            theme::table_row(),
        ),
        Span::styled(
            "   c closed/active  Enter detail  x close  X close all",
            theme::key_hint(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn rule_text(c: &Connection) -> String {
    if c.rule_payload.is_empty() {
        c.rule.clone()
    } else {
        format!("{}({})", c.rule, c.rule_payload)
    }
}

fn render_table(frame: &mut Frame, area: Rect, view: &ConnectionsView) {
    let now = Utc::now();
    let visible = view.visible();

    let rows: Vec<Row> = visible
        .iter()
        .map(|c| {
            Row::new(vec![
                format!("{}:{}", c.target(), c.destination_port),
                c.transport(),
                c.egress().to_owned(),
                rule_text(c),
                bytes_fmt::fmt_rate(c.download_speed),
                bytes_fmt::fmt_rate(c.upload_speed),
                bytes_fmt::fmt_bytes(c.download),
                bytes_fmt::fmt_bytes(c.upload),
                format_age(c.age(now)),
            ])
            .style(theme::table_row())
        })
        .collect();

    let title = if visible.is_empty() {
        let empty = if view.show_closed {
            "No closed connections"
        } else {
            "No connections"
        };
        format!(" {} ", placeholder(view.loaded, empty))
    } else {
        format!(" {}/{} ", view.selected + 1, visible.len())
    };

    let header = Row::new([
        "Host", "Network", "Chain", "Rule", "↓/s", "↑/s", "↓", "↑", "Age",
    ])
    .style(theme::table_header());
    let table = Table::new(
        rows,
        [
            Constraint::Fill(3),
            Constraint::Length(12),
            Constraint::Fill(1),
            Constraint::Fill(2),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(panel(title, true))
    .row_highlight_style(theme::table_selected());

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(view.selected));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

// ── Detail popup ─────────────────────────────────────────────────────

fn field(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), theme::key_hint()),
        Span::styled(value.into(), theme::table_row()),
    ])
}

fn geo_lines(info: &IpInfo) -> Vec<Line<'static>> {
    let place: Vec<&str> = [&info.city, &info.region, &info.country]
        .into_iter()
        .filter_map(|v| v.as_deref())
        .collect();
    let mut lines = vec![field(
        "Location",
        if place.is_empty() { "-".to_owned() } else { place.join(", ") },
    )];
    if let Some(asn) = info.asn {
        let org = info.asn_organization.as_deref().unwrap_or("");
        lines.push(field("ASN", format!("AS{asn} {org}")));
    }
    if let Some(isp) = info.isp.as_deref().or(info.organization.as_deref()) {
        lines.push(field("ISP", isp));
    }
    if let Some(tz) = &info.timezone {
        lines.push(field("Timezone", tz.clone()));
    }
    lines
}

/// The popup's text, separate from drawing so it can be checked directly.
pub(crate) fn detail_lines(detail: &DetailState) -> Vec<Line<'static>> {
    let c = &detail.connection;
    let mut lines = vec![
        field("ID", c.id.clone()),
        field("Host", c.target().to_owned()),
        field("Destination", format!("{}:{}", c.destination_ip, c.destination_port)),
        field("Source", format!("{}:{}", c.source_ip, c.source_port)),
        field("Network", c.transport()),
        field("Rule", rule_text(c)),
        field("Chain", c.chains.join(" ← ")),
        field("Process", if c.process.is_empty() { "-" } else { c.process.as_str() }),
        field("Upload", bytes_fmt::fmt_bytes(c.upload)),
        field("Download", bytes_fmt::fmt_bytes(c.download)),
        field(
            "Started",
            c.start
                .map_or_else(|| "-".to_owned(), |s| s.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ),
        Line::from(""),
    ];

    match &detail.geo {
        GeoState::Pending => lines.push(field("Location", "looking up…")),
        GeoState::Resolved(info) => lines.extend(geo_lines(info)),
        GeoState::Unavailable => lines.push(field("Location", "unavailable")),
    }
    lines
}

fn render_detail(frame: &mut Frame, area: Rect, detail: &DetailState) {
    let width = 72u16.min(area.width.saturating_sub(4));
    let height = 20u16.min(area.height.saturating_sub(2));
    let popup = Rect::new(
        area.x + (area.width.saturating_sub(width)) / 2,
        area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(detail_lines(detail))
            .wrap(Wrap { trim: false })
            .scroll((detail.scroll, 0))
            .block(panel(" Connection (Esc close, ↑/↓ scroll) ".into(), true)),
        popup,
    );
}
