//! Response-shape detection
//!
//! A successful reply is either JSON carrying the result URL or the processed video
//! itself. The declared content type is trusted first; when it is missing or wrong,
//! the first non-whitespace byte decides whether a JSON parse is attempted.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde_json::Value as JsonValue;
use thiserror::Error;
use unmark_core::{InferenceResult, ObjectUrlStore, OutputEncoding, ResultBlob};

/// JSON fields that can carry the result URL, highest priority first
pub const RESULT_URL_FIELDS: [&str; 3] = ["output", "video_url", "url"];

const DEFAULT_VIDEO_TYPE: &str = "video/mp4";

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Response body is not valid base64: {0}")]
    InvalidBase64(String),

    #[error("Inference service returned an empty response")]
    Empty,
}

/// What a successful reply body turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyShape {
    ResultUrl(String),
    Binary,
}

fn claims_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_lowercase().contains("json"))
        .unwrap_or(false)
}

fn looks_like_json(body: &[u8]) -> bool {
    matches!(
        body.iter().find(|b| !b.is_ascii_whitespace()),
        Some(b'{') | Some(b'[')
    )
}

fn result_url(value: &JsonValue) -> Option<String> {
    RESULT_URL_FIELDS.iter().find_map(|field| {
        value
            .get(*field)
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn shape_of_json(body: &[u8]) -> Option<BodyShape> {
    let value: JsonValue = serde_json::from_slice(body).ok()?;
    match result_url(&value) {
        Some(url) => Some(BodyShape::ResultUrl(url)),
        None => {
            tracing::warn!(
                "Inference reply is JSON without a result URL field, treating it as binary"
            );
            Some(BodyShape::Binary)
        }
    }
}

/// Decide whether a successful reply carries a result URL or the video bytes.
pub fn classify_body(content_type: Option<&str>, body: &[u8]) -> BodyShape {
    if claims_json(content_type) {
        if let Some(shape) = shape_of_json(body) {
            return shape;
        }
        tracing::debug!("Declared JSON reply failed to parse, sniffing body");
    }

    if looks_like_json(body) {
        if let Some(shape) = shape_of_json(body) {
            return shape;
        }
    }

    BodyShape::Binary
}

fn decode_base64(body: &[u8]) -> Result<Bytes, DecodeError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?
        .trim()
        .trim_matches('"');

    // Tolerate a data URL wrapper
    let payload = match text.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => text,
    };

    STANDARD
        .decode(payload)
        .map(Bytes::from)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}

fn blob_media_type(content_type: Option<&str>) -> String {
    match content_type {
        Some(ct) if !ct.is_empty() && !claims_json(Some(ct)) && !ct.starts_with("text/") => {
            ct.to_string()
        }
        _ => DEFAULT_VIDEO_TYPE.to_string(),
    }
}

/// Turn a successful reply body into a result, allocating an ephemeral URL for binary payloads.
pub fn materialize(
    body: Bytes,
    content_type: Option<&str>,
    encoding: OutputEncoding,
    store: &ObjectUrlStore,
) -> Result<InferenceResult, DecodeError> {
    match classify_body(content_type, &body) {
        BodyShape::ResultUrl(url) => Ok(InferenceResult::Url(url)),
        BodyShape::Binary => {
            let bytes = match encoding {
                OutputEncoding::Binary => body,
                OutputEncoding::Base64 => decode_base64(&body)?,
            };
            if bytes.is_empty() {
                return Err(DecodeError::Empty);
            }

            let url = store.create(bytes, blob_media_type(content_type));
            tracing::debug!(url = %url.as_str(), bytes = url.byte_len(), "Materialized binary result");
            Ok(InferenceResult::Blob(ResultBlob::new(url)))
        }
    }
}
