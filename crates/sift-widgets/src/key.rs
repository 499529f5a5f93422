//! Key bindings: a described action and the key presses that trigger it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A key press with the modifiers that must be held alongside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCombination {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombination {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    fn label(&self) -> String {
        let key = match self.code {
            KeyCode::Enter => "enter".to_string(),
            KeyCode::Esc => "esc".to_string(),
            KeyCode::Tab => "tab".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Char(' ') => "space".to_string(),
            KeyCode::Char(c) => c.to_string(),
            other => format!("{other:?}").to_lowercase(),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("ctrl+{key}")
        } else {
            key
        }
    }
}

/// One action and the key combinations that trigger it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub keys: Vec<KeyCombination>,
    pub description: String,
}

impl Binding {
    pub fn new(keys: impl IntoIterator<Item = KeyCombination>, description: impl Into<String>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            description: description.into(),
        }
    }

    /// Whether `event` is one of this binding's keys with at least the
    /// required modifiers held.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.keys
            .iter()
            .any(|k| k.code == event.code && event.modifiers.contains(k.modifiers))
    }

    /// Short hint such as `enter/space select`.
    pub fn hint(&self) -> String {
        let keys: Vec<String> = self.keys.iter().map(KeyCombination::label).collect();
        format!("{} {}", keys.join("/"), self.description)
    }
}
