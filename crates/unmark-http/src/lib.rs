//! Shared HTTP transport for Unmark.
//!
//! Provides a minimal client with a default request timeout and a configurable
//! credential header (X-API-Key or Bearer token). Hosting backends and the inference
//! remover use it directly. The transport never interprets status codes; callers do.

use anyhow::{Context, Result};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;
use unmark_core::{Config, ErrorMetadata, LogLevel};

/// Credential strategy for a request.
#[derive(Clone, Default)]
pub enum Auth {
    /// No credential header
    #[default]
    None,
    /// `x-api-key: {key}`
    XApiKey(String),
    /// `Authorization: Bearer {token}`
    Bearer(String),
}

impl Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Auth::None => write!(f, "None"),
            Auth::XApiKey(_) => write!(f, "XApiKey([REDACTED])"),
            Auth::Bearer(_) => write!(f, "Bearer([REDACTED])"),
        }
    }
}

/// A request that never produced a response.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Request {
                url: url.to_string(),
                source,
            }
        }
    }

    pub fn url(&self) -> &str {
        match self {
            TransportError::Timeout { url } | TransportError::Request { url, .. } => url,
        }
    }
}

impl ErrorMetadata for TransportError {
    fn error_code(&self) -> &'static str {
        match self {
            TransportError::Timeout { .. } => "TRANSPORT_TIMEOUT",
            TransportError::Request { .. } => "TRANSPORT_FAILED",
        }
    }

    fn is_recoverable(&self) -> bool {
        true
    }

    fn client_message(&self) -> String {
        match self {
            TransportError::Timeout { .. } => "The request timed out".to_string(),
            TransportError::Request { .. } => "Network request failed".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Warn
    }
}

/// HTTP client shared by every outbound call of a pipeline.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }

    /// Client using the configured transport timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.http_timeout())
    }

    /// Default per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn apply_auth(request: RequestBuilder, auth: &Auth) -> RequestBuilder {
        match auth {
            Auth::None => request,
            Auth::XApiKey(key) => request.header("x-api-key", key.as_str()),
            Auth::Bearer(token) => request.header("Authorization", format!("Bearer {}", token)),
        }
    }

    /// POST a multipart form. Returns the response whatever its status.
    pub async fn post_multipart(
        &self,
        url: &str,
        form: Form,
    ) -> std::result::Result<Response, TransportError> {
        tracing::debug!(endpoint = %url, "Sending multipart request");

        self.client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))
    }

    /// POST a JSON body with the given credential. Returns the response whatever its status.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        auth: &Auth,
    ) -> std::result::Result<Response, TransportError> {
        tracing::debug!(endpoint = %url, "Sending JSON request");

        let request = self.client.post(url).json(body);
        Self::apply_auth(request, auth)
            .send()
            .await
            .map_err(|e| TransportError::from_reqwest(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_post_json_sends_api_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/run")
            .match_header("x-api-key", "secret")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "input": "https://a/b.mp4" })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let response = client
            .post_json(
                &format!("{}/run", server.url()),
                &json!({ "input": "https://a/b.mp4" }),
                &Auth::XApiKey("secret".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_json_bearer() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/run")
            .match_header("authorization", "Bearer tok")
            .with_status(204)
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        client
            .post_json(
                &format!("{}/run", server.url()),
                &json!({}),
                &Auth::Bearer("tok".to_string()),
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/upload")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        let form = Form::new().text("field", "value");
        let response = client
            .post_multipart(&format!("{}/upload", server.url()), form)
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(response.text().await.unwrap(), "boom");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        let result = client
            .post_json("http://127.0.0.1:1/run", &json!({}), &Auth::None)
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.url(), "http://127.0.0.1:1/run");
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_auth_debug_redacts() {
        let debug = format!("{:?}", Auth::XApiKey("sk-123".to_string()));
        assert!(!debug.contains("sk-123"));
    }
}
