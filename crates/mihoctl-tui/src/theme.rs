//! Palette and semantic styling for the dashboard.

use ratatui::style::{Color, Modifier, Style};

use mihoctl_core::{ChannelState, LatencyOutcome, LogLevel};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const LIGHT_BLUE: Color = Color::Rgb(139, 233, 253); // #8be9fd

/// Upload is drawn in coral, download in cyan, everywhere.
pub const UPLOAD: Color = CORAL;
pub const DOWNLOAD: Color = NEON_CYAN;

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

/// Border for a focused panel.
pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

/// Border for an unfocused panel.
pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Table header row.
pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Normal table row text.
pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Selected / highlighted table row.
pub fn table_selected() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .bg(BG_HIGHLIGHT)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR_RED).add_modifier(Modifier::BOLD)
}

pub fn notice_text() -> Style {
    Style::default().fg(SUCCESS_GREEN)
}

/// Text being typed into a filter or field.
pub fn input_text() -> Style {
    Style::default().fg(ELECTRIC_YELLOW)
}

// ── Domain colours ────────────────────────────────────────────────────

/// Green under 200ms, yellow under 500ms, red above and on failure.
pub fn latency_color(outcome: &LatencyOutcome) -> Color {
    match outcome.millis() {
        Some(ms) if ms < 200 => SUCCESS_GREEN,
        Some(ms) if ms < 500 => ELECTRIC_YELLOW,
        _ => ERROR_RED,
    }
}

pub fn log_level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Debug => BORDER_GRAY,
        LogLevel::Info => LIGHT_BLUE,
        LogLevel::Warning => ELECTRIC_YELLOW,
        LogLevel::Error => ERROR_RED,
        LogLevel::Silent => DIM_WHITE,
    }
}

pub fn channel_color(state: ChannelState) -> Color {
    match state {
        ChannelState::Streaming => SUCCESS_GREEN,
        ChannelState::Connecting => ELECTRIC_YELLOW,
        ChannelState::Disconnected => ERROR_RED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latency_thresholds() {
        assert_eq!(latency_color(&LatencyOutcome::Millis(199)), SUCCESS_GREEN);
        assert_eq!(latency_color(&LatencyOutcome::Millis(200)), ELECTRIC_YELLOW);
        assert_eq!(latency_color(&LatencyOutcome::Millis(499)), ELECTRIC_YELLOW);
        assert_eq!(latency_color(&LatencyOutcome::Millis(500)), ERROR_RED);
        assert_eq!(
            latency_color(&LatencyOutcome::Failed("Timeout".into())),
            ERROR_RED
        );
    }
}
