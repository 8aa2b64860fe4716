//! reqwest-backed implementation of [`CollectionApi`]

use crate::request::require_identifier;
use crate::CollectionApi;
use async_trait::async_trait;
use postman_sync_common::{
    normalize, ApiKey, Operation, RemoteCause, RemoteError, Result, SyncError,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde_json::Value;
use tracing::{debug, info};

/// Production Postman API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.getpostman.com";

const API_KEY_PARAM: &str = "apikey";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host of the API, e.g. `https://api.getpostman.com`
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Postman collections API client
#[derive(Debug, Clone)]
pub struct PostmanClient {
    http: Client,
    base_url: Url,
}

impl PostmanClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SyncError::Config(format!("invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SyncError::Config(format!(
                "base URL '{}' cannot hold a path",
                config.base_url
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("postman-sync/", env!("CARGO_PKG_VERSION"))),
        );

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/collections` or `<base>/collections/<id>`
    ///
    /// The id is pushed as a path segment, so reserved characters are escaped.
    pub fn collection_url(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("collections");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    fn request(&self, method: Method, url: Url, api_key: &ApiKey) -> RequestBuilder {
        self.http
            .request(method, url)
            .query(&[(API_KEY_PARAM, api_key.expose())])
            .header(API_KEY_PARAM, api_key.expose())
    }

    async fn send(&self, operation: Operation, request: RequestBuilder) -> Result<Value> {
        let message = failure_message(operation);

        let response = request
            .send()
            .await
            .map_err(|e| RemoteError::new(message, RemoteCause::Transport(Box::new(e))))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::new(message, RemoteCause::Transport(Box::new(e))))?;

        if !status.is_success() {
            let body = serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
            return Err(RemoteError::new(
                message,
                RemoteCause::Status {
                    status: status.as_u16(),
                    body,
                },
            )
            .into());
        }

        let body = serde_json::from_slice(&bytes)
            .map_err(|e| RemoteError::new(message, RemoteCause::Transport(Box::new(e))))?;

        info!(%operation, status = status.as_u16(), "collection request completed");
        Ok(body)
    }
}

fn failure_message(operation: Operation) -> &'static str {
    match operation {
        Operation::Import => "error on import json to postman",
        Operation::Update => "error on update collection",
        Operation::Fetch => "error on get collection",
        Operation::Delete => "error on delete collection",
    }
}

#[async_trait]
impl CollectionApi for PostmanClient {
    async fn import_collection(&self, api_key: &ApiKey, document: &Value) -> Result<Value> {
        let body = normalize(document.clone());
        let url = self.collection_url(None);
        debug!(%url, "importing collection");

        let request = self.request(Method::POST, url, api_key).json(&body);
        self.send(Operation::Import, request).await
    }

    async fn update_collection(
        &self,
        api_key: &ApiKey,
        id: &str,
        document: &Value,
    ) -> Result<Value> {
        let id = require_identifier(Operation::Update, Some(id))?;
        let body = normalize(document.clone());
        let url = self.collection_url(Some(id));
        debug!(%url, "updating collection");

        let request = self.request(Method::PUT, url, api_key).json(&body);
        self.send(Operation::Update, request).await
    }

    async fn fetch_collection(&self, api_key: &ApiKey, id: &str) -> Result<Value> {
        let id = require_identifier(Operation::Fetch, Some(id))?;
        let url = self.collection_url(Some(id));
        debug!(%url, "fetching collection");

        let request = self.request(Method::GET, url, api_key);
        self.send(Operation::Fetch, request).await
    }

    async fn delete_collection(&self, api_key: &ApiKey, id: &str) -> Result<Value> {
        let id = require_identifier(Operation::Delete, Some(id))?;
        let url = self.collection_url(Some(id));
        debug!(%url, "deleting collection");

        let request = self.request(Method::DELETE, url, api_key);
        self.send(Operation::Delete, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_urls() {
        let client = PostmanClient::with_default_config().unwrap();
        assert_eq!(
            client.collection_url(None).as_str(),
            "https://api.getpostman.com/collections"
        );
        assert_eq!(
            client.collection_url(Some("1234-abc")).as_str(),
            "https://api.getpostman.com/collections/1234-abc"
        );
    }

    #[test]
    fn test_collection_url_escapes_id() {
        let client = PostmanClient::new(ClientConfig {
            base_url: "http://localhost:8080/".to_string(),
        })
        .unwrap();
        assert_eq!(
            client.collection_url(Some("a/b c")).as_str(),
            "http://localhost:8080/collections/a%2Fb%20c"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = PostmanClient::new(ClientConfig {
            base_url: "not a url".to_string(),
        });
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[tokio::test]
    async fn test_blank_id_rejected_before_network() {
        // Unroutable base URL: reaching the network would fail differently
        let client = PostmanClient::new(ClientConfig {
            base_url: "http://192.0.2.1".to_string(),
        })
        .unwrap();

        let err = client
            .update_collection(&ApiKey::new("key"), "  ", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SyncError::MissingIdentifier { operation: Operation::Update }
        ));
    }
}
