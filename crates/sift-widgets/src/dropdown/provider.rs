//! Query handling: local filtering, remote search gating, and the tickets
//! that let the newest timer or request win.

use super::item::Item;

/// Items whose searched fields contain `query`, case-insensitively, in
/// dataset order. An empty query keeps everything.
pub fn filter_local(items: &[Item], query: &str, keys: &[&str]) -> Vec<Item> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| {
            keys.iter().any(|key| {
                item.text(key)
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
        })
        .cloned()
        .collect()
}

/// What a keystroke in remote mode should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPlan {
    /// Cleared query: fetch the unfiltered list now.
    Immediate,
    /// Long enough: fetch after the debounce delay.
    Debounced,
    /// Too short: fetch nothing and drop any scheduled fetch.
    Skip,
}

impl SearchPlan {
    /// Length is counted in chars.
    pub fn for_query(query: &str, min_length: usize) -> Self {
        if query.is_empty() {
            SearchPlan::Immediate
        } else if query.chars().count() >= min_length {
            SearchPlan::Debounced
        } else {
            SearchPlan::Skip
        }
    }
}

/// Identifies one scheduled timer or issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Monotonic ticket counter. Only the most recently issued ticket is
/// current; results carrying an older one are stale.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    latest: u64,
}

impl Sequence {
    pub fn advance(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}
