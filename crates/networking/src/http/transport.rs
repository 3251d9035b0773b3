//! Request/response seam between the client and the wire

use async_trait::async_trait;
use boxtrack_core::{Config, Error, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, instrument};

pub use reqwest::Method;

const USER_AGENT_VALUE: &str = concat!("boxtrack/", env!("CARGO_PKG_VERSION"));

/// One outgoing call, with a path relative to the API base URL
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Status plus decoded body; `Null` when the body was empty
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one request and hands back whatever status came back.
///
/// Only a missing response is an error (`TransportFault`); every HTTP
/// status, 4xx and 5xx included, is returned as data.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// `reqwest`-backed transport against the configured backend
pub struct HttpTransport {
    http: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .default_headers(Self::default_headers())
            .user_agent(USER_AGENT_VALUE)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.api_url.clone(),
        })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url(&request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", url, e);
            Error::TransportFault(e.to_string())
        })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|e| {
            error!("Failed to read response body from {}: {}", url, e);
            Error::TransportFault(e.to_string())
        })?;

        // Error pages are not always JSON; keep them as text
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        debug!("Response status: {}", status);
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_onto_base_url() {
        let config = Config {
            api_url: "http://localhost:8000/api/".to_string(),
            ..Config::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.url("/boxes/?closed=false"), "http://localhost:8000/api/boxes/?closed=false");
        assert_eq!(transport.url("summary/"), "http://localhost:8000/api/summary/");
    }

    #[test]
    fn request_debug_hides_bearer() {
        let request = ApiRequest::new(Method::GET, "balance/").with_bearer("secret-token");
        let printed = format!("{:?}", request);
        assert!(!printed.contains("secret-token"));
        assert!(printed.contains("<redacted>"));
    }
}
