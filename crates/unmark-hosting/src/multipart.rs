//! Request and reply helpers shared by the backends

use reqwest::multipart::Part;
use reqwest::{Body, Response};
use unmark_core::SourceAsset;

use crate::traits::{HostingError, HostingResult};

const MAX_ERROR_BODY_CHARS: usize = 200;

/// The asset as a multipart `file` part carrying its name and media type.
pub(crate) fn file_part(asset: &SourceAsset) -> HostingResult<Part> {
    let part = || {
        Part::stream_with_length(Body::from(asset.data().clone()), asset.byte_len())
            .file_name(asset.name().to_string())
    };

    part()
        .mime_str(asset.content_type())
        .or_else(|_| part().mime_str("application/octet-stream"))
        .map_err(|e| HostingError::InvalidRequest(e.to_string()))
}

/// Read the reply body, turning a non-success status into `Rejected`.
pub(crate) async fn success_body(response: Response) -> HostingResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| HostingError::MalformedResponse(format!("Failed to read body: {}", e)))?;

    if !status.is_success() {
        return Err(HostingError::Rejected {
            status: status.as_u16(),
            message: truncate(body.trim()),
        });
    }

    Ok(body)
}

/// Shorten a reply for error messages.
pub(crate) fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY_CHARS {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{}...", head)
    }
}
