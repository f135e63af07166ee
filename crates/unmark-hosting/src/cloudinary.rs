//! Cloudinary backend
//!
//! Unsigned upload through an upload preset. Only used when both the cloud name and
//! the preset are configured.

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;
use unmark_core::{CloudinaryConfig, HostingKind, SourceAsset};
use unmark_http::HttpClient;

use crate::multipart::{file_part, truncate};
use crate::traits::{HostingBackend, HostingError, HostingResult};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct CloudinaryUpload {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorBody {
    error: Option<CloudinaryErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct CloudinaryErrorDetail {
    message: Option<String>,
}

pub struct CloudinaryBackend {
    http: HttpClient,
    endpoint: String,
    upload_preset: String,
}

impl CloudinaryBackend {
    pub fn new(http: HttpClient, config: &CloudinaryConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/{}/upload", API_BASE, config.cloud_name),
            upload_preset: config.upload_preset.clone(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HostingBackend for CloudinaryBackend {
    fn name(&self) -> &str {
        HostingKind::Cloudinary.service_name()
    }

    fn kind(&self) -> HostingKind {
        HostingKind::Cloudinary
    }

    async fn submit(&self, asset: &SourceAsset) -> HostingResult<String> {
        let form = Form::new()
            .part("file", file_part(asset)?)
            .text("upload_preset", self.upload_preset.clone())
            .text("resource_type", "video");

        let response = self.http.post_multipart(&self.endpoint, form).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| HostingError::MalformedResponse(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<CloudinaryErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Cloudinary upload failed".to_string());

            tracing::warn!(
                backend = "Cloudinary",
                status = %status,
                error = %message,
                "Cloudinary upload failed"
            );
            return Err(HostingError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let upload: CloudinaryUpload = serde_json::from_str(&body).map_err(|e| {
            HostingError::MalformedResponse(format!("{}: {}", e, truncate(&body)))
        })?;

        let non_empty = |url: Option<String>| url.filter(|u| !u.trim().is_empty());
        non_empty(upload.secure_url)
            .or_else(|| non_empty(upload.url))
            .ok_or_else(|| {
                HostingError::MalformedResponse("Cloudinary reply has no URL".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use std::time::Duration;
    use unmark_core::AssetLimits;

    fn asset() -> SourceAsset {
        SourceAsset::new("clip.mp4", "video/mp4", vec![1u8; 64], &AssetLimits::default()).unwrap()
    }

    fn config() -> CloudinaryConfig {
        CloudinaryConfig {
            cloud_name: "demo".to_string(),
            upload_preset: "unsigned_video".to_string(),
        }
    }

    fn backend(server: &Server) -> CloudinaryBackend {
        CloudinaryBackend::new(HttpClient::new(Duration::from_secs(5)).unwrap(), &config())
            .with_endpoint(format!("{}/v1_1/demo/upload", server.url()))
    }

    #[test]
    fn test_default_endpoint() {
        let backend =
            CloudinaryBackend::new(HttpClient::new(Duration::from_secs(5)).unwrap(), &config());
        assert_eq!(
            backend.endpoint(),
            "https://api.cloudinary.com/v1_1/demo/upload"
        );
    }

    #[tokio::test]
    async fn test_prefers_secure_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v1_1/demo/upload")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("name=\"upload_preset\"".to_string()),
                Matcher::Regex("unsigned_video".to_string()),
                Matcher::Regex("name=\"resource_type\"".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"secure_url":"https://res.cloudinary.com/demo/v.mp4","url":"http://res.cloudinary.com/demo/v.mp4"}"#,
            )
            .create_async()
            .await;

        let url = backend(&server).submit(&asset()).await.unwrap();
        assert_eq!(url, "https://res.cloudinary.com/demo/v.mp4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_falls_back_to_plain_url() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/upload")
            .with_status(200)
            .with_body(r#"{"url":"http://res.cloudinary.com/demo/v.mp4"}"#)
            .create_async()
            .await;

        let url = backend(&server).submit(&asset()).await.unwrap();
        assert_eq!(url, "http://res.cloudinary.com/demo/v.mp4");
    }

    #[tokio::test]
    async fn test_empty_secure_url_is_skipped() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/upload")
            .with_status(200)
            .with_body(r#"{"secure_url":"","url":"http://res.cloudinary.com/demo/v.mp4"}"#)
            .create_async()
            .await;

        let url = backend(&server).submit(&asset()).await.unwrap();
        assert_eq!(url, "http://res.cloudinary.com/demo/v.mp4");
    }

    #[tokio::test]
    async fn test_error_message_is_extracted() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/upload")
            .with_status(400)
            .with_body(r#"{"error":{"message":"Upload preset not found"}}"#)
            .create_async()
            .await;

        let err = backend(&server).submit(&asset()).await.unwrap_err();
        match err {
            HostingError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Upload preset not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
