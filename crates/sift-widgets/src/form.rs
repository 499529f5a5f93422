//! The host a dropdown attaches to.
//!
//! A [`Form`] is a small, shared model of the page around the widgets: named
//! fields with ids, classes, values and a text direction. Attaching a dropdown
//! to a field hides the field and adds a hidden *mirror* entry carrying the
//! dropdown's value under the field's name, so [`Form::submission`] keeps
//! reporting a value for it.
//!
//! The form is a cheap, cloneable handle; every clone sees the same fields.

use crate::dropdown::Direction;
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;

/// A field on the host form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field {
    pub id: Option<String>,
    pub name: Option<String>,
    pub classes: Vec<String>,
    pub value: String,
    pub direction: Option<Direction>,
    hidden: bool,
}

impl Field {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Key the field submits under: its name, else its id.
    pub fn submit_key(&self) -> Option<&str> {
        self.name.as_deref().or(self.id.as_deref())
    }
}

/// Handle to a field inside a [`Form`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported selector `{0}`; expected #id, .class or [name=value]")]
    Unsupported(String),
}

/// The selector forms a dropdown can attach with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Id(String),
    Class(String),
    Name(String),
}

impl Selector {
    fn matches(&self, field: &Field) -> bool {
        match self {
            Selector::Id(id) => field.id.as_deref() == Some(id),
            Selector::Class(class) => field.classes.iter().any(|c| c == class),
            Selector::Name(name) => field.name.as_deref() == Some(name),
        }
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, SelectorError> {
        let s = s.trim();
        let unsupported = || SelectorError::Unsupported(s.to_string());
        let ident = |rest: &str| {
            if rest.is_empty() || rest.contains(char::is_whitespace) {
                Err(unsupported())
            } else {
                Ok(rest.to_string())
            }
        };
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }
        if let Some(rest) = s.strip_prefix('#') {
            return ident(rest).map(Selector::Id);
        }
        if let Some(rest) = s.strip_prefix('.') {
            return ident(rest).map(Selector::Class);
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            let (attr, value) = inner.split_once('=').ok_or_else(unsupported)?;
            if attr.trim() != "name" {
                return Err(unsupported());
            }
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            return ident(value).map(Selector::Name);
        }
        Err(unsupported())
    }
}

#[derive(Debug, Default)]
struct FormState {
    fields: Vec<Field>,
    mirrors: Vec<(String, String)>,
    direction: Option<Direction>,
}

/// Shared handle to the host form.
#[derive(Debug, Clone, Default)]
pub struct Form {
    inner: Arc<Mutex<FormState>>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Document-level text direction, the last fallback for panel direction.
    pub fn with_direction(self, direction: Direction) -> Self {
        self.inner.lock().direction = Some(direction);
        self
    }

    pub fn direction(&self) -> Option<Direction> {
        self.inner.lock().direction
    }

    pub fn add_field(&self, field: Field) -> FieldId {
        let mut state = self.inner.lock();
        state.fields.push(field);
        FieldId(state.fields.len() - 1)
    }

    pub fn field(&self, id: FieldId) -> Option<Field> {
        self.inner.lock().fields.get(id.0).cloned()
    }

    /// Fields matching `selector`, in insertion order.
    pub fn select(&self, selector: &str) -> Result<Vec<FieldId>, SelectorError> {
        let selector: Selector = selector.parse()?;
        let state = self.inner.lock();
        Ok(state
            .fields
            .iter()
            .enumerate()
            .filter(|(_, field)| selector.matches(field))
            .map(|(index, _)| FieldId(index))
            .collect())
    }

    /// Current value of the mirror entry named `name`.
    pub fn mirror_value(&self, name: &str) -> Option<String> {
        let state = self.inner.lock();
        state
            .mirrors
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Key/value pairs the form would submit: every visible field that has a
    /// name or id, followed by the dropdown mirrors.
    pub fn submission(&self) -> Vec<(String, String)> {
        let state = self.inner.lock();
        state
            .fields
            .iter()
            .filter(|field| !field.hidden)
            .filter_map(|field| Some((field.submit_key()?.to_string(), field.value.clone())))
            .chain(state.mirrors.iter().cloned())
            .collect()
    }

    fn set_hidden(&self, id: FieldId, hidden: bool) {
        if let Some(field) = self.inner.lock().fields.get_mut(id.0) {
            field.hidden = hidden;
        }
    }

    fn set_mirror(&self, name: &str, value: &str) {
        let mut state = self.inner.lock();
        match state.mirrors.iter_mut().find(|(key, _)| key == name) {
            Some((_, current)) => *current = value.to_string(),
            None => state.mirrors.push((name.to_string(), value.to_string())),
        }
    }

    fn remove_mirror(&self, name: &str) {
        self.inner.lock().mirrors.retain(|(key, _)| key != name);
    }
}

/// A dropdown's hold on its host field: the field is hidden and its value
/// lives in a mirror entry until the binding is released.
#[derive(Debug, Clone)]
pub struct HostBinding {
    form: Form,
    field: FieldId,
    mirror: Option<String>,
}

impl HostBinding {
    /// Hide the field and create its mirror, seeded with the field's value.
    /// `None` when the field does not exist.
    pub(crate) fn attach(form: &Form, field: FieldId) -> Option<Self> {
        let host = form.field(field)?;
        let mirror = host.submit_key().map(str::to_string);
        form.set_hidden(field, true);
        if let Some(name) = &mirror {
            form.set_mirror(name, &host.value);
        }
        Some(Self {
            form: form.clone(),
            field,
            mirror,
        })
    }

    pub fn field(&self) -> Option<Field> {
        self.form.field(self.field)
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub(crate) fn write(&self, value: &str) {
        if let Some(name) = &self.mirror {
            self.form.set_mirror(name, value);
        }
    }

    /// Drop the mirror and show the host field again.
    pub(crate) fn release(self) {
        if let Some(name) = &self.mirror {
            self.form.remove_mirror(name);
        }
        self.form.set_hidden(self.field, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_selectors() {
        assert_eq!("#fruit".parse(), Ok(Selector::Id("fruit".into())));
        assert_eq!(".picker".parse(), Ok(Selector::Class("picker".into())));
        assert_eq!("[name=country]".parse(), Ok(Selector::Name("country".into())));
        assert_eq!("[name=\"country\"]".parse(), Ok(Selector::Name("country".into())));
        assert_eq!("".parse::<Selector>(), Err(SelectorError::Empty));
        assert!(matches!("div > p".parse::<Selector>(), Err(SelectorError::Unsupported(_))));
        assert!(matches!("[id=x]".parse::<Selector>(), Err(SelectorError::Unsupported(_))));
    }

    #[test]
    fn select_by_class_keeps_order() {
        let form = Form::new();
        let a = form.add_field(Field::new().with_id("a").with_class("pick"));
        form.add_field(Field::new().with_id("b"));
        let c = form.add_field(Field::new().with_id("c").with_class("pick"));
        assert_eq!(form.select(".pick").unwrap(), vec![a, c]);
        assert!(form.select("#zzz").unwrap().is_empty());
    }

    #[test]
    fn binding_hides_field_and_mirrors_value() {
        let form = Form::new();
        let id = form.add_field(Field::new().with_id("fruit").with_name("fruit_id").with_value("2"));
        form.add_field(Field::new().with_name("note").with_value("hi"));

        let binding = HostBinding::attach(&form, id).unwrap();
        assert!(binding.field().unwrap().is_hidden());
        assert_eq!(form.mirror_value("fruit_id").as_deref(), Some("2"));

        binding.write("3");
        assert_eq!(
            form.submission(),
            vec![("note".to_string(), "hi".to_string()), ("fruit_id".to_string(), "3".to_string())]
        );
    }

    #[test]
    fn release_restores_field() {
        let form = Form::new();
        let id = form.add_field(Field::new().with_id("fruit"));
        let binding = HostBinding::attach(&form, id).unwrap();
        binding.write("1");
        binding.release();
        assert!(!form.field(id).unwrap().is_hidden());
        assert_eq!(form.mirror_value("fruit"), None);
        assert_eq!(form.submission(), vec![("fruit".to_string(), String::new())]);
    }

    #[test]
    fn clones_share_state() {
        let form = Form::new().with_direction(Direction::Rtl);
        let other = form.clone();
        other.add_field(Field::new().with_id("x"));
        assert_eq!(form.select("#x").unwrap().len(), 1);
        assert_eq!(form.direction(), Some(Direction::Rtl));
    }
}
