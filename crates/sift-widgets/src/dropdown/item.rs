use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One selectable entry: an open record of JSON fields.
///
/// Which fields matter is decided by the configuration (`valueKey`,
/// `labelKey`, and the rich-template keys); everything else rides along
/// untouched and comes back in [`Selected`](super::Message::Selected).
///
/// ```rust
/// use sift_widgets::dropdown::Item;
///
/// let apple = Item::new().with("id", 1).with("name", "Apple");
/// assert_eq!(apple.text("name").as_deref(), Some("Apple"));
/// assert_eq!(apple.text("id").as_deref(), Some("1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Item(Map<String, Value>);

impl Item {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The field as display text. Missing and `null` fields have none.
    pub fn text(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(display_text)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether `key` holds `value`, comparing display text so that `"2"`
    /// matches `2`.
    pub(crate) fn matches(&self, key: &str, value: &Value) -> bool {
        match (self.get(key), display_text(value)) {
            (Some(own), Some(wanted)) => own == value || display_text(own).as_deref() == Some(&wanted),
            _ => false,
        }
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Item {
    type Error = Value;

    /// Only JSON objects are items; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Value> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

/// Render a scalar JSON value as text. Strings lose their quotes; arrays and
/// objects fall back to their JSON form.
pub(crate) fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
