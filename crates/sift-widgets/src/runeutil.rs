//! Text measurement helpers for painting labels into fixed-width cells.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Replace control characters (tabs, newlines, escape sequences from remote
/// payloads) with spaces so a label always occupies a single row.
pub fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Display width in terminal columns; wide CJK characters count as two.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_width` columns, ending with `tail` when
/// anything was cut.
///
/// ```
/// use sift_widgets::runeutil::truncate;
///
/// assert_eq!(truncate("Pineapple", 6, "…"), "Pinea…");
/// assert_eq!(truncate("Fig", 6, "…"), "Fig");
/// ```
pub fn truncate(s: &str, max_width: usize, tail: &str) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(display_width(tail));
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        out.push(c);
        width += w;
    }
    if display_width(tail) <= max_width {
        out.push_str(tail);
    }
    out
}
