//! Single-line input editing.
//!
//! The text itself lives in the chat state's input buffer so that submit
//! always reads what is on screen; this module only tracks the cursor and
//! applies edits to that buffer.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use unicode_width::UnicodeWidthChar;

/// Cursor position within the input, in chars.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cursor {
    col: usize,
}

impl Cursor {
    pub fn col(self) -> usize {
        self.col
    }

    /// Clamps after the buffer changed underneath (submit, prompt shortcut).
    pub fn clamp(&mut self, text: &str) {
        self.col = self.col.min(text.chars().count());
    }

    pub fn move_end(&mut self, text: &str) {
        self.col = text.chars().count();
    }

    /// Inserts `text` at the cursor. Line breaks become spaces.
    pub fn insert_str(&mut self, buffer: &mut String, text: &str) {
        self.clamp(buffer);
        let flattened: String = text
            .chars()
            .filter(|c| *c != '\r')
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let byte_idx = char_to_byte_index(buffer, self.col);
        buffer.insert_str(byte_idx, &flattened);
        self.col += flattened.chars().count();
    }

    /// Applies an editing key. Returns false when the key is not an edit.
    pub fn input(&mut self, buffer: &mut String, key: KeyEvent) -> bool {
        if matches!(key.kind, KeyEventKind::Release) {
            return false;
        }
        self.clamp(buffer);
        let len = buffer.chars().count();

        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let byte_idx = char_to_byte_index(buffer, self.col);
                buffer.replace_range(..byte_idx, "");
                self.col = 0;
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                let chars: Vec<char> = buffer.chars().collect();
                let start = scan_left_word(&chars, self.col);
                let from = char_to_byte_index(buffer, start);
                let to = char_to_byte_index(buffer, self.col);
                buffer.replace_range(from..to, "");
                self.col = start;
            }
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let byte_idx = char_to_byte_index(buffer, self.col);
                buffer.insert(byte_idx, ch);
                self.col += 1;
            }
            KeyCode::Backspace if self.col > 0 => {
                let byte_idx = char_to_byte_index(buffer, self.col - 1);
                buffer.remove(byte_idx);
                self.col -= 1;
            }
            KeyCode::Delete if self.col < len => {
                let byte_idx = char_to_byte_index(buffer, self.col);
                buffer.remove(byte_idx);
            }
            KeyCode::Left => self.col = self.col.saturating_sub(1),
            KeyCode::Right => self.col = (self.col + 1).min(len),
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = len,
            KeyCode::Backspace | KeyCode::Delete => {}
            _ => return false,
        }
        true
    }
}

/// Display column of the cursor, accounting for wide characters.
pub fn display_col(text: &str, cursor: Cursor) -> usize {
    text.chars()
        .take(cursor.col)
        .map(|c| c.width().unwrap_or(0))
        .sum()
}

fn char_to_byte_index(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map_or(text.len(), |(idx, _)| idx)
}

fn scan_left_word(chars: &[char], mut idx: usize) -> usize {
    while idx > 0 && chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    while idx > 0 && !chars[idx - 1].is_whitespace() {
        idx -= 1;
    }
    idx
}
