//! Source asset validation
//!
//! A file is accepted when its declared media type is a video type or its name ends
//! in `.mp4`, and its size is within the configured limit.

use std::path::Path;

use crate::error::ValidationError;

pub const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 100;
pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Size constraints applied to every selected file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetLimits {
    pub max_size_bytes: u64,
}

impl AssetLimits {
    /// Limit of `max_mb` MiB, saturating at `u64::MAX` bytes.
    pub fn from_megabytes(max_mb: u64) -> Self {
        Self {
            max_size_bytes: max_mb.saturating_mul(BYTES_PER_MB),
        }
    }

    pub fn max_megabytes(&self) -> u64 {
        self.max_size_bytes / BYTES_PER_MB
    }
}

impl Default for AssetLimits {
    fn default() -> Self {
        Self::from_megabytes(DEFAULT_MAX_VIDEO_SIZE_MB)
    }
}

/// Check a candidate file's metadata against the type and size rules.
pub fn validate_asset(
    name: &str,
    content_type: &str,
    size: u64,
    limits: &AssetLimits,
) -> Result<(), ValidationError> {
    let is_video = content_type.to_lowercase().starts_with("video/");
    if !is_video && !name.to_lowercase().ends_with(".mp4") {
        return Err(ValidationError::UnsupportedType {
            name: name.to_string(),
            content_type: content_type.to_string(),
        });
    }

    if size > limits.max_size_bytes {
        return Err(ValidationError::TooLarge {
            size,
            max_mb: limits.max_megabytes(),
        });
    }

    if size == 0 {
        return Err(ValidationError::Empty {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Guess a media type from a file extension.
pub fn content_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_video_type() {
        let limits = AssetLimits::default();
        assert!(validate_asset("clip.webm", "video/webm", 1024, &limits).is_ok());
    }

    #[test]
    fn test_accepts_mp4_name_with_generic_type() {
        let limits = AssetLimits::default();
        assert!(validate_asset("clip.mp4", "application/octet-stream", 1024, &limits).is_ok());
    }

    #[test]
    fn test_rejects_non_video() {
        let limits = AssetLimits::default();
        let err = validate_asset("photo.png", "image/png", 1024, &limits).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let limits = AssetLimits::from_megabytes(1);
        assert!(validate_asset("a.mp4", "video/mp4", 1024 * 1024, &limits).is_ok());
        let err = validate_asset("a.mp4", "video/mp4", 1024 * 1024 + 1, &limits).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size: 1024 * 1024 + 1,
                max_mb: 1
            }
        );
    }

    #[test]
    fn test_huge_limit_saturates() {
        let limits = AssetLimits::from_megabytes(u64::MAX);
        assert_eq!(limits.max_size_bytes, u64::MAX);
        assert!(validate_asset("a.mp4", "video/mp4", 1024, &limits).is_ok());
    }

    #[test]
    fn test_rejects_empty_file() {
        let limits = AssetLimits::default();
        let err = validate_asset("a.mp4", "video/mp4", 0, &limits).unwrap_err();
        assert!(matches!(err, ValidationError::Empty { .. }));
    }

    #[test]
    fn test_content_type_for_path() {
        assert_eq!(content_type_for_path(Path::new("x/CLIP.MP4")), "video/mp4");
        assert_eq!(content_type_for_path(Path::new("a.mov")), "video/quicktime");
        assert_eq!(
            content_type_for_path(Path::new("noext")),
            "application/octet-stream"
        );
    }
}
