//! file.io backend

use async_trait::async_trait;
use reqwest::multipart::Form;
use serde::Deserialize;
use unmark_core::{HostingKind, SourceAsset};
use unmark_http::HttpClient;

use crate::multipart::{file_part, success_body, truncate};
use crate::traits::{HostingBackend, HostingError, HostingResult};

pub const DEFAULT_ENDPOINT: &str = "https://file.io";

#[derive(Debug, Deserialize)]
struct FileIoResponse {
    #[serde(default)]
    success: bool,
    link: Option<String>,
}

pub struct FileIoBackend {
    http: HttpClient,
    endpoint: String,
}

impl FileIoBackend {
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
impl HostingBackend for FileIoBackend {
    fn name(&self) -> &str {
        HostingKind::FileIo.service_name()
    }

    fn kind(&self) -> HostingKind {
        HostingKind::FileIo
    }

    async fn submit(&self, asset: &SourceAsset) -> HostingResult<String> {
        let form = Form::new().part("file", file_part(asset)?);
        let response = self.http.post_multipart(&self.endpoint, form).await?;
        let body = success_body(response).await?;

        let reply: FileIoResponse = serde_json::from_str(&body).map_err(|e| {
            HostingError::MalformedResponse(format!("{}: {}", e, truncate(&body)))
        })?;

        match reply.link {
            Some(link) if reply.success => Ok(link),
            _ => Err(HostingError::MalformedResponse(format!(
                "file.io did not report success: {}",
                truncate(&body)
            ))),
        }
    }
}
