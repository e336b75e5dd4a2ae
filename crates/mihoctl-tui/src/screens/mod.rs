//! One render function per page, plus the pieces they share.
//!
//! Every function here reads `ViewState` and draws; none of them mutate
//! anything.

mod connections;
mod help;
mod logs;
mod nodes;
mod rules;
mod settings;

use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
};

use mihoctl_core::input::{EditBuffer, InputMode, PageInput};
use mihoctl_core::{Page, ViewState};

use crate::theme;

/// Draw the active page into `area`.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    match state.page {
        Page::Nodes => nodes::render(frame, area, &state.nodes),
        Page::Connections => connections::render(frame, area, state),
        Page::Logs => logs::render(frame, area, &state.logs),
        Page::Rules => rules::render(frame, area, &state.rules),
        Page::Settings => settings::render(frame, area, &state.settings),
        Page::Help => help::render(frame, area),
    }
}

// ── Shared pieces ────────────────────────────────────────────────────

/// Rounded panel with a styled title.
pub(crate) fn panel(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(if focused {
            theme::border_focused()
        } else {
            theme::border_default()
        })
}

/// The buffer's text with the character under the cursor reversed.
pub(crate) fn edit_spans(buffer: &EditBuffer) -> Vec<Span<'static>> {
    let text = buffer.text();
    let split = text
        .char_indices()
        .nth(buffer.cursor())
        .map_or(text.len(), |(i, _)| i);
    let (before, rest) = text.split_at(split);
    let mut chars = rest.chars();
    let under = chars.next().map_or_else(|| " ".to_owned(), String::from);
    let after: String = chars.collect();

    vec![
        Span::styled(before.to_owned(), theme::input_text()),
        Span::styled(under, theme::input_text().add_modifier(Modifier::REVERSED)),
        Span::styled(after, theme::input_text()),
    ]
}

/// One-line filter indicator: the live buffer while typing, the committed
/// filter otherwise, or a hint when there is none.
pub(crate) fn filter_line(input: &PageInput) -> Line<'static> {
    if input.mode() == InputMode::FilterEntry {
        let mut spans = vec![Span::styled(" / ", theme::key_hint_key())];
        spans.extend(edit_spans(input.buffer()));
        spans.push(Span::styled("   Enter apply  Esc cancel", theme::key_hint()));
        return Line::from(spans);
    }
    let committed = input.committed_filter();
    if committed.is_empty() {
        Line::from(Span::styled(" / filter", theme::key_hint()))
    } else {
        Line::from(vec![
            Span::styled(" filter: ", theme::key_hint()),
            Span::styled(committed.to_owned(), theme::input_text()),
            Span::styled("   Esc clear", theme::key_hint()),
        ])
    }
}

/// Empty-table placeholder text for pages that have not loaded yet.
pub(crate) fn placeholder(loaded: bool, empty: &'static str) -> &'static str {
    if loaded { empty } else { "Loading…" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(spans: &[Span<'_>]) -> String {
        spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn cursor_sits_on_a_character_boundary() {
        let mut buffer = EditBuffer::with_text("héllo");
        buffer.home();
        buffer.right();
        let spans = edit_spans(&buffer);
        assert_eq!(spans[0].content, "h");
        assert_eq!(spans[1].content, "é");
        assert_eq!(spans[2].content, "llo");
    }

    #[test]
    fn cursor_at_end_shows_a_block() {
        let buffer = EditBuffer::with_text("abc");
        let spans = edit_spans(&buffer);
        assert_eq!(text(&spans), "abc ");
    }
}
