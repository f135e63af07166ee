//! tmpfiles.org backend
//!
//! tmpfiles.org reports a landing-page URL (`/{id}/{file}`); the raw file is served
//! from the same path under `/dl/`. Both forms are exposed as pure transforms.

use async_trait::async_trait;
use reqwest::multipart::Form;
use reqwest::Url;
use serde::Deserialize;
use unmark_core::{HostingKind, SourceAsset};
use unmark_http::HttpClient;

use crate::multipart::{file_part, success_body, truncate};
use crate::traits::{HostingBackend, HostingError, HostingResult};

pub const DEFAULT_ENDPOINT: &str = "https://tmpfiles.org/api/v1/upload";
pub const HOST: &str = "tmpfiles.org";
const DOWNLOAD_SEGMENT: &str = "dl";

#[derive(Debug, Deserialize)]
struct TmpFilesResponse {
    status: Option<String>,
    data: Option<TmpFilesData>,
}

#[derive(Debug, Deserialize)]
struct TmpFilesData {
    url: Option<String>,
}

pub struct TmpFilesBackend {
    http: HttpClient,
    endpoint: String,
}

impl TmpFilesBackend {
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
impl HostingBackend for TmpFilesBackend {
    fn name(&self) -> &str {
        HostingKind::TmpFiles.service_name()
    }

    fn kind(&self) -> HostingKind {
        HostingKind::TmpFiles
    }

    async fn submit(&self, asset: &SourceAsset) -> HostingResult<String> {
        let form = Form::new().part("file", file_part(asset)?);
        let response = self.http.post_multipart(&self.endpoint, form).await?;
        let body = success_body(response).await?;

        let reply: TmpFilesResponse = serde_json::from_str(&body).map_err(|e| {
            HostingError::MalformedResponse(format!("{}: {}", e, truncate(&body)))
        })?;

        let url = match (reply.status.as_deref(), reply.data.and_then(|d| d.url)) {
            (Some("success"), Some(url)) => url,
            _ => {
                return Err(HostingError::MalformedResponse(format!(
                    "tmpfiles.org did not report success: {}",
                    truncate(&body)
                )))
            }
        };

        tracing::debug!(backend = HOST, url = %url, "Upload accepted");
        Ok(url)
    }
}

/// Whether `url` points at tmpfiles.org.
pub fn is_tmpfiles_url(url: &str) -> bool {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == HOST || h.ends_with(".tmpfiles.org")))
        .unwrap_or(false)
}

fn first_segment_is_download(url: &Url) -> bool {
    url.path_segments()
        .and_then(|mut segments| segments.next())
        .map(|first| first == DOWNLOAD_SEGMENT)
        .unwrap_or(false)
}

/// The `/dl/` form of a tmpfiles URL. Already-converted and unparsable URLs are returned as is.
pub fn download_url(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    if first_segment_is_download(&parsed) {
        return url.to_string();
    }

    let path = format!("/{}{}", DOWNLOAD_SEGMENT, parsed.path());
    parsed.set_path(&path);
    parsed.to_string()
}

/// The landing-page form of a tmpfiles URL, without `/dl/`.
pub fn direct_url(url: &str) -> String {
    let mut parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };
    if !first_segment_is_download(&parsed) {
        return url.to_string();
    }

    let rest = parsed
        .path()
        .trim_start_matches('/')
        .strip_prefix(DOWNLOAD_SEGMENT)
        .unwrap_or_default()
        .to_string();
    let path = if rest.is_empty() { "/".to_string() } else { rest };
    parsed.set_path(&path);
    parsed.to_string()
}

/// The other of the two shapes.
pub fn toggle_shape(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if first_segment_is_download(&parsed) => direct_url(url),
        Ok(_) => download_url(url),
        Err(_) => url.to_string(),
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

    fn backend(server: &Server) -> TmpFilesBackend {
        TmpFilesBackend::new(HttpClient::new(Duration::from_secs(5)).unwrap())
            .with_endpoint(format!("{}/api/v1/upload", server.url()))
    }

    #[tokio::test]
    async fn test_success_reply() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/upload")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"success","data":{"url":"https://tmpfiles.org/123/clip.mp4"}}"#,
            )
            .create_async()
            .await;

        let url = backend(&server).submit(&asset()).await.unwrap();
        // Returned untouched; shape normalization happens before inference
        assert_eq!(url, "https://tmpfiles.org/123/clip.mp4");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_reply() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/upload")
            .with_status(200)
            .with_body(r#"{"status":"error","data":{}}"#)
            .create_async()
            .await;

        let result = backend(&server).submit(&asset()).await;
        assert!(matches!(result, Err(HostingError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_invalid_json() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/v1/upload")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let result = backend(&server).submit(&asset()).await;
        assert!(matches!(result, Err(HostingError::MalformedResponse(_))));
    }

    #[test]
    fn test_download_url() {
        assert_eq!(
            download_url("https://tmpfiles.org/123/clip.mp4"),
            "https://tmpfiles.org/dl/123/clip.mp4"
        );
        assert_eq!(
            download_url("https://tmpfiles.org/dl/123/clip.mp4"),
            "https://tmpfiles.org/dl/123/clip.mp4"
        );
        assert_eq!(download_url("not a url"), "not a url");
    }

    #[test]
    fn test_direct_url() {
        assert_eq!(
            direct_url("https://tmpfiles.org/dl/123/clip.mp4"),
            "https://tmpfiles.org/123/clip.mp4"
        );
        assert_eq!(
            direct_url("https://tmpfiles.org/123/clip.mp4"),
            "https://tmpfiles.org/123/clip.mp4"
        );
    }

    #[test]
    fn test_toggle_shape() {
        assert_eq!(
            toggle_shape("https://host/dl/abc/video.mp4"),
            "https://host/abc/video.mp4"
        );
        assert_eq!(
            toggle_shape("https://host/abc/video.mp4"),
            "https://host/dl/abc/video.mp4"
        );
    }

    #[test]
    fn test_is_tmpfiles_url() {
        assert!(is_tmpfiles_url("https://tmpfiles.org/dl/1/a.mp4"));
        assert!(!is_tmpfiles_url("https://0x0.st/a.mp4"));
        assert!(!is_tmpfiles_url("garbage"));
    }
}
