//! Right-to-left support.
//!
//! Two independent decisions: the *panel* direction, resolved once per
//! instance from configuration and the host, and the per-string tag that
//! right-aligns any label containing Hebrew or Arabic script.

use ratatui::layout::Alignment;
use serde::Deserialize;
use unicode_bidi::{bidi_class, BidiClass};

/// Layout direction of a panel, a host field, or the whole form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

impl Direction {
    pub fn is_rtl(self) -> bool {
        self == Direction::Rtl
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Direction::Ltr => Alignment::Left,
            Direction::Rtl => Alignment::Right,
        }
    }
}

/// The `rtl` option: `true`, `false`, or `"auto"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RtlOption")]
pub enum RtlMode {
    /// Take the direction from the `direction` option or the host.
    #[default]
    Auto,
    Rtl,
    Ltr,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RtlOption {
    Flag(bool),
    Word(String),
}

impl TryFrom<RtlOption> for RtlMode {
    type Error = String;

    fn try_from(option: RtlOption) -> Result<Self, String> {
        match option {
            RtlOption::Flag(true) => Ok(RtlMode::Rtl),
            RtlOption::Flag(false) => Ok(RtlMode::Ltr),
            RtlOption::Word(word) if word.eq_ignore_ascii_case("auto") => Ok(RtlMode::Auto),
            RtlOption::Word(word) => Err(format!("expected true, false or \"auto\", got \"{word}\"")),
        }
    }
}

/// Resolve the panel direction. First decisive source wins: the explicit
/// `rtl` flag, the `direction` option, the host field, the form.
pub fn resolve_direction(
    mode: RtlMode,
    configured: Option<Direction>,
    field: Option<Direction>,
    form: Option<Direction>,
) -> Direction {
    match mode {
        RtlMode::Rtl => Direction::Rtl,
        RtlMode::Ltr => Direction::Ltr,
        RtlMode::Auto => configured.or(field).or(form).unwrap_or_default(),
    }
}

/// Whether the text contains any strong right-to-left character.
pub fn contains_rtl(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(bidi_class(c), BidiClass::R | BidiClass::AL))
}
