//! Per-page input modes and the line-edit buffer.
//!
//! Each page that takes text input owns one [`PageInput`]. Its [`InputMode`]
//! is the single authority on how keys are routed: in `FilterEntry` and
//! `FieldEdit` every printable key is literal text, in `Normal` and
//! `DetailView` keys are navigation and global shortcuts.

/// Terminal-agnostic key. The TUI maps its backend's key events to this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// A control chord such as `Ctrl-C`.
    Ctrl(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Tab,
    BackTab,
    /// Bracketed paste.
    Paste(String),
}

/// How a page is currently consuming keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    FilterEntry,
    FieldEdit,
    DetailView,
}

impl InputMode {
    /// Modes in which printable keys are text, not shortcuts.
    pub fn captures_text(self) -> bool {
        matches!(self, Self::FilterEntry | Self::FieldEdit)
    }
}

// ── EditBuffer ───────────────────────────────────────────────────────

/// Single-line text buffer with a cursor measured in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    text: String,
    cursor: usize,
}

impl EditBuffer {
    /// Buffer holding `text` with the cursor at the end.
    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            cursor: text.chars().count(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters, `0..=len`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Byte offset of the `idx`-th character.
    fn byte_at(&self, idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Insert at the cursor and advance past the inserted text. Line
    /// breaks are dropped since the buffer is single-line.
    pub fn insert_str(&mut self, s: &str) {
        let clean: String = s.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
        let at = self.byte_at(self.cursor);
        self.text.insert_str(at, &clean);
        self.cursor += clean.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor >= self.len() {
            return;
        }
        let at = self.byte_at(self.cursor);
        self.text.remove(at);
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.len();
    }

    /// Apply an editing key. Returns `false` for keys that are not edits.
    pub fn handle(&mut self, key: &Key) -> bool {
        match key {
            Key::Char(c) => self.insert(*c),
            Key::Paste(s) => self.insert_str(s),
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Left => self.left(),
            Key::Right => self.right(),
            Key::Home => self.home(),
            Key::End => self.end(),
            _ => return false,
        }
        true
    }
}

// ── PageInput ────────────────────────────────────────────────────────

/// Mode, committed filter, and in-progress buffer for one page.
#[derive(Debug, Clone, Default)]
pub struct PageInput {
    mode: InputMode,
    filter: String,
    buffer: EditBuffer,
}

impl PageInput {
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut EditBuffer {
        &mut self.buffer
    }

    /// The committed filter text.
    pub fn committed_filter(&self) -> &str {
        &self.filter
    }

    /// Filter in effect right now: the live buffer while typing, else the
    /// committed text.
    pub fn active_filter(&self) -> &str {
        if self.mode == InputMode::FilterEntry {
            self.buffer.text()
        } else {
            &self.filter
        }
    }

    /// `Normal` → `FilterEntry`, seeded with the committed filter.
    pub fn begin_filter(&mut self) {
        self.buffer = EditBuffer::with_text(&self.filter);
        self.mode = InputMode::FilterEntry;
    }

    /// `Normal` → `FieldEdit`, seeded with the field's current value.
    pub fn begin_edit(&mut self, current: &str) {
        self.buffer = EditBuffer::with_text(current);
        self.mode = InputMode::FieldEdit;
    }

    pub fn open_detail(&mut self) {
        self.mode = InputMode::DetailView;
    }

    /// Leave the current entry mode, keeping the buffer's text. For
    /// `FilterEntry` the text becomes the committed filter. Returns the
    /// text that was entered.
    pub fn commit(&mut self) -> String {
        let text = std::mem::take(&mut self.buffer).text;
        if self.mode == InputMode::FilterEntry {
            self.filter.clone_from(&text);
        }
        self.mode = InputMode::Normal;
        text
    }

    /// Two-stage escape. From an entry mode: drop the buffer and return to
    /// `Normal`. From `DetailView`: return to `Normal`. From `Normal` with a
    /// committed filter: clear it. Returns `false` when there was nothing
    /// to undo.
    pub fn escape(&mut self) -> bool {
        match self.mode {
            InputMode::FilterEntry | InputMode::FieldEdit => {
                self.buffer.clear();
                self.mode = InputMode::Normal;
            }
            InputMode::DetailView => self.mode = InputMode::Normal,
            InputMode::Normal if !self.filter.is_empty() => self.filter.clear(),
            InputMode::Normal => return false,
        }
        true
    }
}
