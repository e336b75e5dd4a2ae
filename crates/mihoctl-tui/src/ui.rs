//! Frame layout: the active page above a tab bar and a status line.
//!
//! `draw` is a pure function of `ViewState`; the event loop calls it on
//! every render tick.

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};

use mihoctl_core::{Channel, Page, ViewState, humanize_error};

use crate::screens;
use crate::theme;

pub fn draw(frame: &mut Frame, state: &ViewState) {
    let [content, tabs, status] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    screens::render(frame, content, state);
    render_tab_bar(frame, tabs, state.page);
    render_status_bar(frame, status, state);
}

fn render_tab_bar(frame: &mut Frame, area: Rect, active: Page) {
    let titles: Vec<Line> = Page::ALL
        .iter()
        .map(|&page| {
            let style = if page == active {
                theme::tab_active()
            } else {
                theme::tab_inactive()
            };
            Line::from(Span::styled(
                format!(" {} {} ", page.number(), page.label()),
                style,
            ))
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" ", theme::key_hint()))
        .select(Page::ALL.iter().position(|&p| p == active).unwrap_or(0));
    frame.render_widget(tabs, area);
}

/// Stream health dots, daemon version, then the error, notice, or hints.
pub(crate) fn status_line(state: &ViewState, width: u16) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for channel in Channel::ALL {
        spans.push(Span::styled(
            "●",
            Style::default().fg(theme::channel_color(state.channel_state(channel))),
        ));
        spans.push(Span::styled(format!("{channel} "), theme::key_hint()));
    }
    if let Some(version) = &state.daemon_version {
        spans.push(Span::styled(format!("│ mihomo {version} "), theme::key_hint()));
    }
    spans.push(Span::styled("│ ", theme::key_hint()));

    if let Some(error) = &state.last_error {
        spans.push(Span::styled(
            humanize_error(error, usize::from(width)),
            theme::error_text(),
        ));
    } else if let Some(notice) = &state.notice {
        spans.push(Span::styled(notice.clone(), theme::notice_text()));
    } else {
        spans.push(Span::styled("6 help  r refresh  q quit", theme::key_hint()));
    }
    Line::from(spans)
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    frame.render_widget(Paragraph::new(status_line(state, area.width)), area);
}
