// ── Logs page state ──

use std::collections::VecDeque;

use crate::filter;
use crate::input::PageInput;
use crate::model::{LogEntry, LogLevel};

/// Log ring bound; oldest entries are evicted first.
pub const MAX_LOGS: usize = 1000;

/// Columns moved per horizontal scroll step.
pub const H_SCROLL_STEP: usize = 8;

#[derive(Debug, Clone)]
pub struct LogsView {
    /// Newest first.
    pub entries: VecDeque<LogEntry>,
    /// Minimum level shown.
    pub level: LogLevel,
    pub input: PageInput,
    /// Row offset from the newest visible entry.
    pub selected: usize,
    /// Characters hidden from the left of every payload.
    pub h_scroll: usize,
}

impl Default for LogsView {
    fn default() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOGS),
            level: LogLevel::Info,
            input: PageInput::default(),
            selected: 0,
            h_scroll: 0,
        }
    }
}

impl LogsView {
    pub fn push(&mut self, entry: LogEntry) {
        let shown = filter::log_matches(&entry, self.level, self.input.active_filter());
        self.entries.push_front(entry);
        self.entries.truncate(MAX_LOGS);
        // Keep a scrolled-back reader on the same line.
        if self.selected > 0 && shown {
            self.selected += 1;
            self.clamp_selection();
        }
    }

    pub fn visible(&self) -> Vec<&LogEntry> {
        filter::filter_logs(&self.entries, self.level, self.input.active_filter())
    }

    pub fn raise_level(&mut self) {
        self.level = self.level.raise();
        self.clamp_selection();
    }

    pub fn lower_level(&mut self) {
        self.level = self.level.lower();
        self.clamp_selection();
    }

    pub fn move_by(&mut self, delta: isize) {
        let len = self.visible().len();
        self.selected = self
            .selected
            .saturating_add_signed(delta)
            .min(len.saturating_sub(1));
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Shift payloads left, stopping once the longest visible one ends.
    pub fn scroll_right(&mut self) {
        let widest = self
            .visible()
            .iter()
            .map(|e| e.payload.chars().count())
            .max()
            .unwrap_or(0);
        self.h_scroll = (self.h_scroll + H_SCROLL_STEP).min(widest.saturating_sub(1));
    }

    pub fn scroll_left(&mut self) {
        self.h_scroll = self.h_scroll.saturating_sub(H_SCROLL_STEP);
    }
}
