use super::config::{DropdownConfig, RemoteMethod};
use super::item::Item;
use futures::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Why a remote fetch produced no items.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("response is not valid JSON: {0}")]
    Parse(String),
    #[error("no item array at `{0}`")]
    Malformed(String),
}

/// Source of remote items for one search query.
///
/// The dropdown never awaits a fetch itself; it wraps the returned future in a
/// [`Command`](sift_core::Command) and applies the result when it comes back.
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, query: String) -> BoxFuture<'static, Result<Vec<Item>, FetchError>>;
}

/// Remote endpoint settings taken from a [`DropdownConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub method: RemoteMethod,
    pub search_param: String,
    pub headers: BTreeMap<String, String>,
    pub data_key: Option<String>,
}

impl Endpoint {
    /// `None` in local mode.
    pub fn from_config(config: &DropdownConfig) -> Option<Self> {
        let url = config.remote_url.clone()?;
        Some(Self {
            url,
            method: config.remote_method,
            search_param: config.remote_search_param.clone(),
            headers: config.remote_headers.clone(),
            data_key: config.remote_data_key.clone().filter(|key| !key.is_empty()),
        })
    }

    /// GET target: the URL with the search parameter appended, joined with
    /// `&` when the URL already carries a query string.
    pub fn request_url(&self, query: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let param: String = url::form_urlencoded::byte_serialize(self.search_param.as_bytes()).collect();
        let value: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        format!("{}{separator}{param}={value}", self.url)
    }

    async fn send(&self, client: &reqwest::Client, query: String) -> Result<Vec<Item>, FetchError> {
        let mut request = match self.method {
            RemoteMethod::Get => client.get(self.request_url(&query)),
            RemoteMethod::Post => client.post(&self.url),
        };
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if self.method == RemoteMethod::Post {
            let mut body = Map::new();
            body.insert(self.search_param.clone(), Value::String(query));
            if !self.headers.keys().any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str())) {
                request = request.header(CONTENT_TYPE, "application/json");
            }
            request = request.body(Value::Object(body).to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let payload: Value = response
            .json()
            .await
            .map_err(|err| FetchError::Parse(err.to_string()))?;
        extract_items(payload, self.data_key.as_deref())
    }
}

/// The default [`Fetch`] implementation, over HTTP with `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: Arc<Endpoint>,
}

impl HttpFetcher {
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    /// Share a configured client (timeouts, proxies, TLS roots).
    pub fn with_client(client: reqwest::Client, endpoint: Endpoint) -> Self {
        Self {
            client,
            endpoint: Arc::new(endpoint),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, query: String) -> BoxFuture<'static, Result<Vec<Item>, FetchError>> {
        let client = self.client.clone();
        let endpoint = Arc::clone(&self.endpoint);
        Box::pin(async move { endpoint.send(&client, query).await })
    }
}

/// Pull the item array out of a response payload: `payload[data_key]`, or
/// the payload itself without a key. Entries that are not objects are skipped.
pub fn extract_items(payload: Value, data_key: Option<&str>) -> Result<Vec<Item>, FetchError> {
    let list = match data_key {
        Some(key) => match payload {
            Value::Object(mut map) => map.remove(key),
            _ => None,
        },
        None => Some(payload),
    };
    let location = data_key.unwrap_or("<root>");
    match list {
        Some(Value::Array(values)) => Ok(values
            .into_iter()
            .filter_map(|value| match Item::try_from(value) {
                Ok(item) => Some(item),
                Err(other) => {
                    tracing::debug!(entry = %other, "skipping non-object entry in remote payload");
                    None
                }
            })
            .collect()),
        _ => Err(FetchError::Malformed(location.to_string())),
    }
}
