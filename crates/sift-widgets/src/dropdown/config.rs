use super::item::Item;
use super::rtl::{Direction, RtlMode};
use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Errors from building or parsing a [`DropdownConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid dropdown options: {0}")]
    Json(#[from] serde_json::Error),
    #[error("option `{0}` must not be empty")]
    Empty(&'static str),
    #[error("invalid remoteUrl `{url}`: {source}")]
    RemoteUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid remote header `{0}`")]
    Header(String),
    #[error("styles.maxHeight must be at least 1")]
    MaxHeight,
}

/// HTTP method for remote fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum RemoteMethod {
    #[default]
    #[serde(rename = "GET", alias = "get")]
    Get,
    #[serde(rename = "POST", alias = "post")]
    Post,
}

/// Row layout for items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    /// The label alone.
    #[default]
    Default,
    /// Image marker, title, subtitle and status badge.
    Rich,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Visual options, measured in terminal cells.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct Styles {
    /// Trigger and panel width in columns; the full area when unset.
    pub width: Option<u16>,
    /// Visible item rows before the list scrolls.
    pub max_height: u16,
    /// Blank columns on each side of a row's text.
    pub item_padding: u16,
    /// Accepted for compatibility; terminals have a single font size.
    pub font_size: Option<u16>,
    /// Any value above zero draws rounded borders.
    pub border_radius: u16,
    pub theme: Theme,
}

impl Default for Styles {
    fn default() -> Self {
        Self {
            width: None,
            max_height: 8,
            item_padding: 1,
            font_size: None,
            border_radius: 1,
            theme: Theme::Light,
        }
    }
}

/// Immutable, validated dropdown options.
///
/// Build one with [`DropdownConfig::builder`] or parse the camelCase option
/// object with [`DropdownConfig::from_json`]; both validate. Once handed to a
/// dropdown the value is shared read-only.
///
/// ```rust
/// use sift_widgets::dropdown::DropdownConfig;
///
/// let config = DropdownConfig::from_json(r##"{
///     "selector": "#fruit",
///     "data": [{"id": 1, "name": "Apple"}],
///     "debounceDelay": 150
/// }"##).unwrap();
/// assert_eq!(config.debounce_delay().as_millis(), 150);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct DropdownConfig {
    pub(crate) selector: Option<String>,
    pub(crate) placeholder: String,
    pub(crate) search_placeholder: String,
    pub(crate) no_results_text: String,
    pub(crate) loading_text: String,
    pub(crate) data: Vec<Item>,
    pub(crate) value_key: String,
    pub(crate) label_key: String,
    pub(crate) remote_url: Option<String>,
    pub(crate) remote_search_param: String,
    pub(crate) remote_method: RemoteMethod,
    pub(crate) remote_headers: BTreeMap<String, String>,
    pub(crate) remote_data_key: Option<String>,
    pub(crate) min_search_length: usize,
    pub(crate) debounce_delay: u64,
    pub(crate) add_button: bool,
    pub(crate) add_button_label: String,
    pub(crate) add_button_icon: String,
    pub(crate) template: Template,
    pub(crate) title_key: String,
    pub(crate) subtitle_key: String,
    pub(crate) status_key: String,
    pub(crate) image_key: String,
    pub(crate) styles: Styles,
    pub(crate) rtl: RtlMode,
    pub(crate) direction: Option<Direction>,
    pub(crate) animation_duration: u64,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            selector: None,
            placeholder: "Select an option".into(),
            search_placeholder: "Search...".into(),
            no_results_text: "No results found".into(),
            loading_text: "Loading...".into(),
            data: Vec::new(),
            value_key: "id".into(),
            label_key: "name".into(),
            remote_url: None,
            remote_search_param: "search".into(),
            remote_method: RemoteMethod::Get,
            remote_headers: BTreeMap::new(),
            remote_data_key: None,
            min_search_length: 1,
            debounce_delay: 300,
            add_button: false,
            add_button_label: "Add new".into(),
            add_button_icon: "+".into(),
            template: Template::Default,
            title_key: "title".into(),
            subtitle_key: "subtitle".into(),
            status_key: "status".into(),
            image_key: "image".into(),
            styles: Styles::default(),
            rtl: RtlMode::Auto,
            direction: None,
            animation_duration: 200,
        }
    }
}

impl DropdownConfig {
    pub fn builder() -> DropdownConfigBuilder {
        DropdownConfigBuilder::default()
    }

    /// Parse and validate a JSON option object.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("valueKey", &self.value_key),
            ("labelKey", &self.label_key),
            ("remoteSearchParam", &self.remote_search_param),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        if let Some(url) = &self.remote_url {
            url::Url::parse(url).map_err(|source| ConfigError::RemoteUrl {
                url: url.clone(),
                source,
            })?;
        }
        for (name, value) in &self.remote_headers {
            if HeaderName::from_bytes(name.as_bytes()).is_err() || HeaderValue::from_str(value).is_err() {
                return Err(ConfigError::Header(name.clone()));
            }
        }
        if self.styles.max_height == 0 {
            return Err(ConfigError::MaxHeight);
        }
        Ok(())
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    pub fn value_key(&self) -> &str {
        &self.value_key
    }

    pub fn label_key(&self) -> &str {
        &self.label_key
    }

    pub fn data(&self) -> &[Item] {
        &self.data
    }

    pub fn remote_url(&self) -> Option<&str> {
        self.remote_url.as_deref()
    }

    /// Whether items come from a remote endpoint instead of `data`.
    pub fn is_remote(&self) -> bool {
        self.remote_url.is_some()
    }

    pub fn remote_method(&self) -> RemoteMethod {
        self.remote_method
    }

    pub fn min_search_length(&self) -> usize {
        self.min_search_length
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_delay)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration)
    }

    pub fn template(&self) -> Template {
        self.template
    }

    pub fn styles(&self) -> &Styles {
        &self.styles
    }

    pub fn has_add_button(&self) -> bool {
        self.add_button
    }

    /// Fields the local filter searches: the label, plus title and subtitle
    /// for the rich template.
    pub(crate) fn search_keys(&self) -> Vec<&str> {
        match self.template {
            Template::Default => vec![self.label_key.as_str()],
            Template::Rich => vec![
                self.label_key.as_str(),
                self.title_key.as_str(),
                self.subtitle_key.as_str(),
            ],
        }
    }
}

/// Builder for [`DropdownConfig`]; starts from the defaults.
#[derive(Debug, Clone, Default)]
pub struct DropdownConfigBuilder {
    config: DropdownConfig,
}

macro_rules! string_setters {
    ($($(#[$doc:meta])* $method:ident => $field:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $method(mut self, value: impl Into<String>) -> Self {
                self.config.$field = value.into();
                self
            }
        )*
    };
}

impl DropdownConfigBuilder {
    string_setters! {
        with_placeholder => placeholder,
        with_search_placeholder => search_placeholder,
        with_no_results_text => no_results_text,
        with_loading_text => loading_text,
        /// Field whose value identifies an item.
        with_value_key => value_key,
        /// Field shown as the item's label.
        with_label_key => label_key,
        /// Query parameter (GET) or body field (POST) carrying the search text.
        with_remote_search_param => remote_search_param,
        with_add_button_label => add_button_label,
        with_add_button_icon => add_button_icon,
        with_title_key => title_key,
        with_subtitle_key => subtitle_key,
        with_status_key => status_key,
        with_image_key => image_key,
    }

    /// Host selector: `#id`, `.class` or `[name=value]`.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.config.selector = Some(selector.into());
        self
    }

    pub fn with_data(mut self, data: impl IntoIterator<Item = Item>) -> Self {
        self.config.data = data.into_iter().collect();
        self
    }

    /// Switch to remote mode against this endpoint.
    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.config.remote_url = Some(url.into());
        self
    }

    pub fn with_remote_method(mut self, method: RemoteMethod) -> Self {
        self.config.remote_method = method;
        self
    }

    pub fn with_remote_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.remote_headers.insert(name.into(), value.into());
        self
    }

    /// Read items from this key of the response instead of the top level.
    pub fn with_remote_data_key(mut self, key: impl Into<String>) -> Self {
        self.config.remote_data_key = Some(key.into());
        self
    }

    pub fn with_min_search_length(mut self, chars: usize) -> Self {
        self.config.min_search_length = chars;
        self
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.config.debounce_delay = delay.as_millis() as u64;
        self
    }

    pub fn with_add_button(mut self, enabled: bool) -> Self {
        self.config.add_button = enabled;
        self
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.config.template = template;
        self
    }

    pub fn with_styles(mut self, styles: Styles) -> Self {
        self.config.styles = styles;
        self
    }

    pub fn with_rtl(mut self, mode: RtlMode) -> Self {
        self.config.rtl = mode;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.config.direction = Some(direction);
        self
    }

    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.config.animation_duration = duration.as_millis() as u64;
        self
    }

    pub fn build(self) -> Result<DropdownConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DropdownConfig::builder().build().unwrap();
        assert_eq!(config.placeholder, "Select an option");
        assert_eq!(config.value_key(), "id");
        assert_eq!(config.label_key(), "name");
        assert_eq!(config.remote_search_param, "search");
        assert_eq!(config.min_search_length(), 1);
        assert_eq!(config.debounce_delay(), Duration::from_millis(300));
        assert_eq!(config.styles().max_height, 8);
        assert!(!config.is_remote());
    }

    #[test]
    fn json_uses_camel_case_names() {
        let config = DropdownConfig::from_json(
            r#"{
                "remoteUrl": "https://api.test/items",
                "remoteMethod": "POST",
                "remoteHeaders": {"Authorization": "Bearer t"},
                "remoteDataKey": "results",
                "minSearchLength": 2,
                "template": "rich",
                "rtl": "auto",
                "direction": "rtl",
                "styles": {"maxHeight": 4, "theme": "dark"}
            }"#,
        )
        .unwrap();
        assert!(config.is_remote());
        assert_eq!(config.remote_method(), RemoteMethod::Post);
        assert_eq!(config.remote_data_key.as_deref(), Some("results"));
        assert_eq!(config.template(), Template::Rich);
        assert_eq!(config.direction, Some(Direction::Rtl));
        assert_eq!(config.styles().theme, Theme::Dark);
        assert_eq!(config.styles().item_padding, 1);
    }

    #[test]
    fn unknown_options_are_rejected() {
        let err = DropdownConfig::from_json(r#"{"onSelect": "alert"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn empty_keys_are_rejected() {
        let err = DropdownConfig::builder().with_value_key(" ").build().unwrap_err();
        assert!(matches!(err, ConfigError::Empty("valueKey")));
    }

    #[test]
    fn bad_remote_url_is_rejected() {
        let err = DropdownConfig::builder().with_remote_url("not a url").build().unwrap_err();
        assert!(matches!(err, ConfigError::RemoteUrl { .. }));
    }

    #[test]
    fn bad_header_is_rejected() {
        let err = DropdownConfig::builder()
            .with_remote_header("Bad Header", "x")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Header(_)));
    }

    #[test]
    fn zero_max_height_is_rejected() {
        let err = DropdownConfig::from_json(r#"{"styles": {"maxHeight": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::MaxHeight));
    }

    #[test]
    fn rich_template_searches_title_and_subtitle() {
        let config = DropdownConfig::builder().with_template(Template::Rich).build().unwrap();
        assert_eq!(config.search_keys(), vec!["name", "title", "subtitle"]);
    }
}
