use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::object_url::ObjectUrl;

/// How the inference service should encode a binary result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    #[default]
    Binary,
    Base64,
}

impl OutputEncoding {
    /// Value of the request's `base64` flag
    pub fn as_base64_flag(self) -> bool {
        matches!(self, OutputEncoding::Base64)
    }
}

/// One submission to the inference service. Retries build a new request with a
/// different source URL rather than resending this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub source_url: String,
    pub output_encoding: OutputEncoding,
}

impl InferenceRequest {
    pub fn new(source_url: impl Into<String>, output_encoding: OutputEncoding) -> Self {
        Self {
            source_url: source_url.into(),
            output_encoding,
        }
    }

    pub fn with_source_url(&self, source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            output_encoding: self.output_encoding,
        }
    }

    /// JSON body sent to the service. `input_field` varies between endpoint versions.
    pub fn to_body(&self, input_field: &str) -> JsonValue {
        let mut body = Map::new();
        body.insert(
            input_field.to_string(),
            JsonValue::String(self.source_url.clone()),
        );
        body.insert(
            "base64".to_string(),
            JsonValue::Bool(self.output_encoding.as_base64_flag()),
        );
        JsonValue::Object(body)
    }
}

/// Processed video held in memory behind an ephemeral URL.
#[derive(Debug)]
pub struct ResultBlob {
    url: ObjectUrl,
}

impl ResultBlob {
    pub fn new(url: ObjectUrl) -> Self {
        Self { url }
    }

    pub fn url(&self) -> &ObjectUrl {
        &self.url
    }

    pub fn byte_len(&self) -> usize {
        self.url.byte_len()
    }

    /// Hand the URL to a longer-lived owner (e.g. a session slot).
    pub fn into_url(self) -> ObjectUrl {
        self.url
    }
}

/// Outcome of a successful removal.
#[derive(Debug)]
pub enum InferenceResult {
    /// Remote pointer to the processed video
    Url(String),
    /// Raw bytes materialized locally
    Blob(ResultBlob),
}

impl InferenceResult {
    /// A playable/downloadable address, whichever form the result took.
    pub fn playable_url(&self) -> &str {
        match self {
            InferenceResult::Url(url) => url,
            InferenceResult::Blob(blob) => blob.url().as_str(),
        }
    }

    pub fn is_blob(&self) -> bool {
        matches!(self, InferenceResult::Blob(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object_url::ObjectUrlStore;
    use bytes::Bytes;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let request = InferenceRequest::new("https://host/v.mp4", OutputEncoding::Binary);
        assert_eq!(
            request.to_body("input"),
            json!({ "input": "https://host/v.mp4", "base64": false })
        );
        assert_eq!(
            request.to_body("input_video"),
            json!({ "input_video": "https://host/v.mp4", "base64": false })
        );
    }

    #[test]
    fn test_with_source_url_keeps_encoding() {
        let request = InferenceRequest::new("a", OutputEncoding::Base64);
        let retry = request.with_source_url("b");
        assert_eq!(retry.source_url, "b");
        assert_eq!(retry.output_encoding, OutputEncoding::Base64);
    }

    #[test]
    fn test_playable_url_for_both_shapes() {
        let remote = InferenceResult::Url("https://cdn/out.mp4".to_string());
        assert_eq!(remote.playable_url(), "https://cdn/out.mp4");
        assert!(!remote.is_blob());

        let store = ObjectUrlStore::new();
        let local = InferenceResult::Blob(ResultBlob::new(
            store.create(Bytes::from_static(b"1234"), "video/mp4"),
        ));
        assert!(local.playable_url().starts_with("blob:"));
        assert!(local.is_blob());

        drop(local);
        assert!(store.is_empty());
    }
}
