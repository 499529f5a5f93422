//! Single-line editing state for the dropdown's search box.
//!
//! `TextEditState` keeps the query as a char buffer with a cursor, so that
//! multi-byte input (Arabic, accented Latin) edits one character at a time.
//! Every mutating method reports whether the text changed; the dropdown only
//! re-filters or schedules a fetch when it did.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line text buffer with a char-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditState {
    chars: Vec<char>,
    cursor: usize,
}

impl TextEditState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current text.
    pub fn value(&self) -> String {
        self.chars.iter().collect()
    }

    /// Replace the text and move the cursor to the end.
    pub fn set_value(&mut self, s: &str) {
        self.chars = s.chars().collect();
        self.cursor = self.chars.len();
    }

    /// Cursor position as a char index.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn insert_char(&mut self, c: char) -> bool {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
        true
    }

    /// Insert pasted text. Line breaks become spaces.
    pub fn insert_str(&mut self, s: &str) -> bool {
        let before = self.chars.len();
        for c in s.chars() {
            let c = if c == '\n' || c == '\r' { ' ' } else { c };
            self.chars.insert(self.cursor, c);
            self.cursor += 1;
        }
        self.chars.len() != before
    }

    pub fn delete_back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    pub fn delete_forward(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    /// Delete the word before the cursor (Ctrl+W / Alt+Backspace).
    pub fn delete_word_back(&mut self) -> bool {
        let start = self.cursor;
        while self.cursor > 0 && self.chars[self.cursor - 1] == ' ' {
            self.cursor -= 1;
        }
        while self.cursor > 0 && self.chars[self.cursor - 1] != ' ' {
            self.cursor -= 1;
        }
        self.chars.drain(self.cursor..start);
        self.cursor != start
    }

    /// Delete everything before the cursor (Ctrl+U).
    pub fn kill_to_start(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.chars.drain(..self.cursor);
        self.cursor = 0;
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    pub fn reset(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Apply an editing key. Returns whether the text changed; keys that only
    /// move the cursor return `false`, keys this editor ignores too.
    pub fn apply_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);
        match key.code {
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char('u') if ctrl => self.kill_to_start(),
            KeyCode::Char('a') if ctrl => {
                self.move_home();
                false
            }
            KeyCode::Char('e') if ctrl => {
                self.move_end();
                false
            }
            KeyCode::Char(c) if !ctrl && !alt => self.insert_char(c),
            KeyCode::Backspace if alt => self.delete_word_back(),
            KeyCode::Backspace => self.delete_back(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => {
                self.move_left();
                false
            }
            KeyCode::Right => {
                self.move_right();
                false
            }
            KeyCode::Home => {
                self.move_home();
                false
            }
            KeyCode::End => {
                self.move_end();
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_builds_query() {
        let mut state = TextEditState::new();
        assert!(state.apply_key(&key(KeyCode::Char('a'))));
        assert!(state.apply_key(&key(KeyCode::Char('p'))));
        assert_eq!(state.value(), "ap");
        assert_eq!(state.cursor(), 2);
    }

    #[test]
    fn multibyte_chars_edit_as_units() {
        let mut state = TextEditState::new();
        state.set_value("تفاح");
        assert_eq!(state.len(), 4);
        assert!(state.delete_back());
        assert_eq!(state.value(), "تفا");
    }

    #[test]
    fn cursor_moves_do_not_report_change() {
        let mut state = TextEditState::new();
        state.set_value("abc");
        assert!(!state.apply_key(&key(KeyCode::Left)));
        assert!(!state.apply_key(&key(KeyCode::Home)));
        assert_eq!(state.cursor(), 0);
        assert!(!state.apply_key(&key(KeyCode::Backspace)));
        assert!(state.apply_key(&key(KeyCode::Delete)));
        assert_eq!(state.value(), "bc");
    }

    #[test]
    fn ctrl_shortcuts() {
        let mut state = TextEditState::new();
        state.set_value("red apple");
        assert!(state.apply_key(&KeyEvent::new(KeyCode::Char('w'), KeyModifiers::CONTROL)));
        assert_eq!(state.value(), "red ");
        assert!(state.apply_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(state.is_empty());
        assert!(!state.apply_key(&KeyEvent::new(KeyCode::Char('x'), KeyModifiers::ALT)));
    }

    #[test]
    fn paste_flattens_newlines() {
        let mut state = TextEditState::new();
        assert!(state.insert_str("a\nb"));
        assert_eq!(state.value(), "a b");
        assert!(!state.insert_str(""));
    }

    #[test]
    fn delete_word_back_at_start_is_noop() {
        let mut state = TextEditState::new();
        state.set_value("hello");
        state.move_home();
        assert!(!state.delete_word_back());
        assert_eq!(state.value(), "hello");
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = TextEditState::new();
        state.set_value("hello");
        state.reset();
        assert!(state.is_empty());
        assert_eq!(state.cursor(), 0);
    }
}
