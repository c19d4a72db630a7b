use anyhow::Context;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::models::{SearchParams, SearchResponse};
use crate::query;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const PROXY_PATH: &str = "/api/proxy";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("missing API key")]
    MissingApiKey,
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("proxy returned {0}")]
    Status(StatusCode),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub proxy_path: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            proxy_path: PROXY_PATH.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `MARKET_SEARCH_API_KEY` and, when set, `MARKET_SEARCH_BASE_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("MARKET_SEARCH_API_KEY")
            .context("MARKET_SEARCH_API_KEY must be set to the proxy API key")?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var("MARKET_SEARCH_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    fn endpoint(&self, params: &SearchParams) -> Result<Url, SearchError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SearchError::InvalidBaseUrl(format!("{}: {e}", self.base_url)))?;
        // Keep any prefix already on the base url, e.g. `/app` + `/api/proxy`.
        url.path_segments_mut()
            .map_err(|_| SearchError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(self.proxy_path.split('/').filter(|segment| !segment.is_empty()));
        url.set_query(Some(&query::build_query_string(params)));
        Ok(url)
    }
}

#[derive(Clone)]
pub struct SearchClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl SearchClient {
    pub fn new(config: ClientConfig) -> Result<Self, SearchError> {
        if config.api_key.trim().is_empty() {
            return Err(SearchError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("market-search/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, http })
    }

    /// Runs one search against the proxy. Each call is independent; nothing
    /// is cached or retried.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResponse, SearchError> {
        let url = self.config.endpoint(params)?;
        tracing::info!(%url, "searching");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.config.api_key.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            tracing::warn!(%status, "proxy rejected search");
            return Err(SearchError::Status(status));
        }

        let body = resp.bytes().await?;
        let response: SearchResponse =
            serde_json::from_slice(&body).map_err(|e| SearchError::Decode(e.to_string()))?;
        tracing::debug!(
            items = response.items.len(),
            total = ?response.total,
            "search complete"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Serves a single canned response and hands back the raw request text.
    async fn serve_once(status_line: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut request = Vec::new();
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn endpoint_targets_proxy_with_query() {
        let config = ClientConfig::new("key").with_base_url("http://example.test:8080");
        let url = config.endpoint(&SearchParams::default()).unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.test:8080/api/proxy?sort_by=TOTAL_POPULATION&sort_order=DESC&limit=12&offset=0"
        );
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        for base in ["http://example.test/app", "http://example.test/app/"] {
            let url = ClientConfig::new("key")
                .with_base_url(base)
                .endpoint(&SearchParams::default())
                .unwrap();
            assert_eq!(url.path(), "/app/api/proxy");
        }
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let result = SearchClient::new(ClientConfig::new("  "));
        assert!(matches!(result, Err(SearchError::MissingApiKey)));
    }

    #[test]
    fn bad_base_url_is_reported() {
        for base in ["not a url", "mailto:someone@example.test"] {
            let config = ClientConfig::new("key").with_base_url(base);
            assert!(matches!(
                config.endpoint(&SearchParams::default()),
                Err(SearchError::InvalidBaseUrl(_))
            ));
        }
    }

    #[tokio::test]
    async fn search_sends_credentials_and_decodes_items() {
        let body = r#"{"items":[{"parcl_id":2900187,"name":"New York City"}],"total":1}"#;
        let (base_url, server) = serve_once("200 OK", body).await;
        let client = SearchClient::new(ClientConfig::new("secret-key").with_base_url(base_url))
            .unwrap();

        let response = client.search(&SearchParams::default()).await.unwrap();
        let request = server.await.unwrap().to_lowercase();

        assert!(request.starts_with(
            "get /api/proxy?sort_by=total_population&sort_order=desc&limit=12&offset=0 http/1.1"
        ));
        assert!(request.contains("authorization: secret-key"));
        assert!(request.contains("accept: application/json"));
        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0]["name"], "New York City");
        assert_eq!(response.total, Some(1));
    }

    #[tokio::test]
    async fn non_success_status_is_a_failure() {
        let (base_url, server) = serve_once("502 Bad Gateway", "{}").await;
        let client = SearchClient::new(ClientConfig::new("key").with_base_url(base_url)).unwrap();

        let result = client.search(&SearchParams::default()).await;
        server.await.unwrap();

        match result {
            Err(SearchError::Status(status)) => assert_eq!(status, StatusCode::BAD_GATEWAY),
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_failure() {
        let (base_url, server) = serve_once("200 OK", "not json").await;
        let client = SearchClient::new(ClientConfig::new("key").with_base_url(base_url)).unwrap();

        let result = client.search(&SearchParams::default()).await;
        server.await.unwrap();

        assert!(matches!(result, Err(SearchError::Decode(_))));
    }
}
