//! Settings page: the four persisted settings, edited in place.

use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use mihoctl_core::SettingKey;
use mihoctl_core::input::InputMode;
use mihoctl_core::state::SettingsView;

use super::{edit_spans, panel};
use crate::theme;

pub fn render(frame: &mut Frame, area: Rect, view: &SettingsView) {
    let mut lines = vec![Line::from("")];
    lines.extend(SettingKey::ALL.iter().enumerate().map(|(i, &key)| row(view, i, key)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        if view.input.mode() == InputMode::FieldEdit {
            "  Enter save  Esc cancel"
        } else {
            "  ↑/↓ choose  Enter edit"
        },
        theme::key_hint(),
    )));

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Settings ".into(), true)),
        area,
    );
}

fn row(view: &SettingsView, index: usize, key: SettingKey) -> Line<'static> {
    let selected = index == view.selected;
    let marker = if selected { "▸ " } else { "  " };
    let label_style = if selected {
        theme::table_selected()
    } else {
        theme::table_row()
    };

    let mut spans = vec![
        Span::styled(format!(" {marker}"), theme::key_hint_key()),
        Span::styled(format!("{:<14}", key.label()), label_style),
    ];
    if selected && view.input.mode() == InputMode::FieldEdit {
        spans.extend(edit_spans(view.input.buffer()));
    } else {
        spans.push(Span::styled(display_value(key, view.value(key)), theme::table_row()));
    }
    Line::from(spans)
}

/// Stored value as shown; the secret is never printed in full.
fn display_value(key: SettingKey, value: &str) -> String {
    match key {
        SettingKey::Secret => mihoctl_config::mask_secret(value),
        _ => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_masked() {
        assert_eq!(display_value(SettingKey::Secret, "supersecretvalue"), "sup****lue");
        assert_eq!(display_value(SettingKey::Secret, ""), "(not set)");
        assert_eq!(display_value(SettingKey::Timeout, "5000"), "5000");
    }
}
