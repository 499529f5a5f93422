use super::item::Item;
use serde_json::Value;

/// Per-instance data: the full dataset, the filtered view, the query that
/// produced it, the selection and the loading flag.
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: Vec<Item>,
    filtered: Vec<Item>,
    query: String,
    selected: Option<Item>,
    loading: bool,
}

impl Store {
    pub fn new(data: Vec<Item>) -> Self {
        Self {
            filtered: data.clone(),
            data,
            ..Self::default()
        }
    }

    pub fn data(&self) -> &[Item] {
        &self.data
    }

    pub fn filtered(&self) -> &[Item] {
        &self.filtered
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<&Item> {
        self.selected.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the dataset wholesale. The filtered view becomes the new
    /// dataset regardless of the current query.
    pub fn replace(&mut self, items: Vec<Item>) {
        self.filtered = items.clone();
        self.data = items;
    }

    pub fn push(&mut self, item: Item) {
        self.data.push(item);
    }

    pub fn set_filtered(&mut self, items: Vec<Item>) {
        self.filtered = items;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn select(&mut self, item: Item) {
        self.selected = Some(item);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The selected item's identifying value.
    pub fn value(&self, value_key: &str) -> Option<&Value> {
        self.selected.as_ref().and_then(|item| item.get(value_key))
    }

    /// First dataset item whose `value_key` field matches `value`.
    pub fn find(&self, value_key: &str, value: &Value) -> Option<&Item> {
        self.data.iter().find(|item| item.matches(value_key, value))
    }
}
