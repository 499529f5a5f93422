use crate::key::{Binding, KeyCombination};
use crossterm::event::KeyCode;

/// Keyboard contract of a dropdown. Text keys in the search box are not
/// bindings; they go straight to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownKeys {
    /// On the trigger.
    pub open: Binding,
    /// Anywhere; also returns focus to the trigger.
    pub close: Binding,
    /// On an item or the add-new row.
    pub select: Binding,
    pub next: Binding,
    pub prev: Binding,
    /// From the search box to the add-new row.
    pub to_add: Binding,
}

impl Default for DropdownKeys {
    fn default() -> Self {
        let key = KeyCombination::new;
        Self {
            open: Binding::new([key(KeyCode::Enter), key(KeyCode::Char(' ')), key(KeyCode::Down)], "open"),
            close: Binding::new([key(KeyCode::Esc)], "close"),
            select: Binding::new([key(KeyCode::Enter), key(KeyCode::Char(' '))], "select"),
            next: Binding::new([key(KeyCode::Down)], "next"),
            prev: Binding::new([key(KeyCode::Up)], "previous"),
            to_add: Binding::new([key(KeyCode::Tab)], "add new"),
        }
    }
}

impl DropdownKeys {
    /// Hints for a status line, closed and open respectively.
    pub fn hints(&self, open: bool) -> Vec<String> {
        if open {
            [&self.next, &self.prev, &self.select, &self.close]
                .iter()
                .map(|b| b.hint())
                .collect()
        } else {
            vec![self.open.hint()]
        }
    }
}
