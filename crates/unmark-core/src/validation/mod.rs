//! Validation modules

pub mod asset;

pub use asset::{
    content_type_for_path, validate_asset, AssetLimits, BYTES_PER_MB, DEFAULT_MAX_VIDEO_SIZE_MB,
};
