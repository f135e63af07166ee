//! 0x0.st backend
//!
//! Replies with the file URL as plain text.

use async_trait::async_trait;
use reqwest::multipart::Form;
use unmark_core::{HostingKind, SourceAsset};
use unmark_http::HttpClient;

use crate::multipart::{file_part, success_body, truncate};
use crate::traits::{HostingBackend, HostingError, HostingResult};

pub const DEFAULT_ENDPOINT: &str = "https://0x0.st";

pub struct ZeroX0Backend {
    http: HttpClient,
    endpoint: String,
}

impl ZeroX0Backend {
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl HostingBackend for ZeroX0Backend {
    fn name(&self) -> &str {
        HostingKind::ZeroX0.service_name()
    }

    fn kind(&self) -> HostingKind {
        HostingKind::ZeroX0
    }

    async fn submit(&self, asset: &SourceAsset) -> HostingResult<String> {
        let form = Form::new().part("file", file_part(asset)?);
        let response = self.http.post_multipart(&self.endpoint, form).await?;
        let body = success_body(response).await?;

        let url = body.trim();
        if !url.starts_with("http") {
            return Err(HostingError::MalformedResponse(format!(
                "Expected a URL, got: {}",
                truncate(url)
            )));
        }

        tracing::debug!(backend = "0x0.st", url = %url, "Upload accepted");
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::time::Duration;
    use unmark_core::AssetLimits;

    fn asset() -> SourceAsset {
        SourceAsset::new("clip.mp4", "video/mp4", vec![1u8; 64], &AssetLimits::default()).unwrap()
    }

    fn backend(server: &Server) -> ZeroX0Backend {
        ZeroX0Backend::new(HttpClient::new(Duration::from_secs(5)).unwrap())
            .with_endpoint(server.url())
    }

    #[tokio::test]
    async fn test_unreachable_host_keeps_cause_chain() {
        let backend = ZeroX0Backend::new(HttpClient::new(Duration::from_secs(5)).unwrap())
            .with_endpoint("http://127.0.0.1:1/");

        let err = backend.submit(&asset()).await.unwrap_err();
        assert!(matches!(err, HostingError::Transport(_)));

        let details = unmark_core::error_chain(&err);
        assert!(details.starts_with("Request to http://127.0.0.1:1/ failed"));
        assert!(details.contains("Caused by:"));
    }

    #[tokio::test]
    async fn test_plain_text_url_is_trimmed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("https://0x0.st/abc.mp4\n")
            .create_async()
            .await;

        let url = backend(&server).submit(&asset()).await.unwrap();
        assert_eq!(url, "https://0x0.st/abc.mp4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_url_body_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_body("Segmentation fault")
            .create_async()
            .await;

        let result = backend(&server).submit(&asset()).await;
        assert!(matches!(result, Err(HostingError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_error_status_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(503)
            .with_body("busy")
            .create_async()
            .await;

        let result = backend(&server).submit(&asset()).await;
        assert!(matches!(
            result,
            Err(HostingError::Rejected { status: 503, .. })
        ));
    }
}
