use bytes::Bytes;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;

use crate::error::ValidationError;
use crate::validation::{content_type_for_path, validate_asset, AssetLimits};

/// The user-selected video. Only constructed when it passes validation.
#[derive(Clone)]
pub struct SourceAsset {
    name: String,
    content_type: String,
    data: Bytes,
}

impl SourceAsset {
    /// Accept an in-memory file, or reject it with the reason.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
        limits: &AssetLimits,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let content_type = content_type.into();
        let data = data.into();

        validate_asset(&name, &content_type, data.len() as u64, limits)?;

        Ok(Self {
            name,
            content_type,
            data,
        })
    }

    /// Read a file from disk. The size limit is checked before the content is loaded.
    pub async fn from_file(path: &Path, limits: &AssetLimits) -> Result<Self, ValidationError> {
        let unreadable = |e: std::io::Error| ValidationError::Unreadable {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4")
            .to_string();
        let content_type = content_type_for_path(path);

        let metadata = tokio::fs::metadata(path).await.map_err(unreadable)?;
        validate_asset(&name, content_type, metadata.len(), limits)?;

        let data = tokio::fs::read(path).await.map_err(unreadable)?;
        Self::new(name, content_type, data, limits)
    }

    /// Display name of the file
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn byte_len(&self) -> u64 {
        self.data.len() as u64
    }
}

impl Debug for SourceAsset {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SourceAsset")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("byte_len", &self.data.len())
            .finish()
    }
}
