//! Low-level JSON request helper for the Seger API

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Base address used when none is injected and none was set at build time
pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api/seger";

/// User agent attached to every upstream request
pub const DEFAULT_USER_AGENT: &str = "seger-app/1.0";

/// Upstream configuration, immutable once the client is built
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base address every endpoint path is appended to
    pub base_url: String,
    /// Value of the `User-Agent` header
    pub user_agent: String,
    /// Headers sent with every request (default: `Content-Type: application/json`)
    pub default_headers: HeaderMap,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            base_url: option_env!("SEGER_API_BASE")
                .unwrap_or(DEFAULT_API_BASE)
                .to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            default_headers,
        }
    }
}

impl UpstreamConfig {
    /// Default configuration pointed at another upstream
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Client for the Seger upstream API
#[derive(Debug, Clone)]
pub struct SegerClient {
    http: reqwest::Client,
    base_url: String,
}

impl SegerClient {
    /// Build a client from the given configuration
    pub fn new(config: UpstreamConfig) -> Result<Self> {
        let parsed = url::Url::parse(&config.base_url).map_err(|e| Error::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::InvalidBaseUrl {
                url: config.base_url,
                reason: "URL cannot be used as a base".to_string(),
            });
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(config.default_headers)
            .build()
            .map_err(Error::HttpRequest)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base address with any trailing slash removed
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path such as `/faturas`
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Send a request and parse the response body as JSON.
    ///
    /// A non-success status is logged together with the response body and
    /// returned as [`Error::RemoteRequest`]. An empty success body yields
    /// `Value::Null`.
    pub async fn request_json<B>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&B>,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint);
        tracing::debug!(method = %method, url = %url, "Sending upstream request");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!(
                method = %method,
                url = %url,
                status = status.as_u16(),
                body = %text,
                "Upstream request failed"
            );
            return Err(Error::RemoteRequest {
                status: status.as_u16(),
                url,
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
