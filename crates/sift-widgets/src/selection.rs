//! Keyboard cursor over the dropdown's item list.
//!
//! `ListCursor` tracks the highlighted row and the scroll offset of a window of
//! `visible` rows. Movement stops at both ends instead of wrapping: stepping
//! up from the first row is how focus leaves the list for the search box.

use std::ops::Range;

/// Cursor position and scroll offset for a list of `count` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListCursor {
    cursor: usize,
    offset: usize,
    count: usize,
    visible: usize,
}

impl ListCursor {
    pub fn new(count: usize, visible: usize) -> Self {
        Self {
            cursor: 0,
            offset: 0,
            count,
            visible,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn count(&self) -> usize {
        self.count
    }

    /// Rows currently inside the scroll window.
    pub fn window(&self) -> Range<usize> {
        let end = (self.offset + self.visible).min(self.count);
        self.offset.min(end)..end
    }

    pub fn set_count(&mut self, count: usize) {
        self.count = count;
        if self.count == 0 {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.count {
            self.cursor = self.count - 1;
        }
        self.ensure_visible();
    }

    /// Step to the next row. Returns `false` when already on the last one.
    pub fn next(&mut self) -> bool {
        if self.cursor + 1 >= self.count {
            return false;
        }
        self.cursor += 1;
        self.ensure_visible();
        true
    }

    /// Step to the previous row. Returns `false` when already on the first one.
    pub fn prev(&mut self) -> bool {
        if self.cursor == 0 || self.count == 0 {
            return false;
        }
        self.cursor -= 1;
        self.ensure_visible();
        true
    }

    pub fn home(&mut self) {
        self.cursor = 0;
        self.offset = 0;
    }

    pub fn select(&mut self, index: usize) {
        if self.count == 0 {
            return;
        }
        self.cursor = index.min(self.count - 1);
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        if self.count == 0 || self.visible == 0 {
            return;
        }
        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + self.visible {
            self.offset = self.cursor + 1 - self.visible;
        }
        self.offset = self.offset.min(self.count.saturating_sub(self.visible));
    }
}

impl Default for ListCursor {
    fn default() -> Self {
        Self::new(0, 1)
    }
}
