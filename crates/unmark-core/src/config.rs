//! Configuration module
//!
//! This module loads pipeline settings from the environment (and a `.env` file):
//! the inference credential and endpoints, the optional Cloudinary account, hosting
//! fallback order, timeouts, and the asset size limit.

use std::env;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::hosting_types::HostingKind;
use crate::validation::{AssetLimits, BYTES_PER_MB, DEFAULT_MAX_VIDEO_SIZE_MB};

// Defaults
pub const DEFAULT_INFERENCE_V2_URL: &str = "https://api.segmind.com/v2/video-watermark-remover";
pub const DEFAULT_INFERENCE_V1_URL: &str = "https://api.segmind.com/v1/video-watermark-remover";
pub const DEFAULT_INPUT_FIELD: &str = "input";
const UPLOAD_TIMEOUT_SECS: u64 = 30;
const HTTP_TIMEOUT_SECS: u64 = 600;

/// Cloudinary account used as the preferred hosting backend
#[derive(Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

impl Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("upload_preset", &"[REDACTED]")
            .finish()
    }
}

/// Pipeline configuration
#[derive(Clone)]
pub struct Config {
    pub inference_api_key: Option<String>,
    pub inference_v2_url: String,
    pub inference_v1_url: String,
    pub inference_input_field: String,
    pub cloudinary: Option<CloudinaryConfig>,
    pub upload_timeout_secs: u64,
    pub http_timeout_secs: u64,
    pub max_video_size_mb: u64,
    /// Fallback hosting order. Cloudinary is never listed here; it is prepended when configured.
    pub fallback_order: Vec<HostingKind>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference_api_key: None,
            inference_v2_url: DEFAULT_INFERENCE_V2_URL.to_string(),
            inference_v1_url: DEFAULT_INFERENCE_V1_URL.to_string(),
            inference_input_field: DEFAULT_INPUT_FIELD.to_string(),
            cloudinary: None,
            upload_timeout_secs: UPLOAD_TIMEOUT_SECS,
            http_timeout_secs: HTTP_TIMEOUT_SECS,
            max_video_size_mb: DEFAULT_MAX_VIDEO_SIZE_MB,
            fallback_order: HostingKind::default_fallback_order(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let number = |key: &str, default: u64| {
            non_empty(key)
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        let cloudinary = match (
            non_empty("UNMARK_CLOUDINARY_CLOUD_NAME"),
            non_empty("UNMARK_CLOUDINARY_UPLOAD_PRESET"),
        ) {
            (Some(cloud_name), Some(upload_preset)) => Some(CloudinaryConfig {
                cloud_name,
                upload_preset,
            }),
            _ => None,
        };

        let fallback_order = match non_empty("UNMARK_HOSTING_BACKENDS") {
            Some(list) => parse_fallback_order(&list)?,
            None => HostingKind::default_fallback_order(),
        };

        Ok(Self {
            inference_api_key: non_empty("UNMARK_INFERENCE_API_KEY"),
            inference_v2_url: non_empty("UNMARK_INFERENCE_V2_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_V2_URL.to_string()),
            inference_v1_url: non_empty("UNMARK_INFERENCE_V1_URL")
                .unwrap_or_else(|| DEFAULT_INFERENCE_V1_URL.to_string()),
            inference_input_field: non_empty("UNMARK_INFERENCE_INPUT_FIELD")
                .unwrap_or_else(|| DEFAULT_INPUT_FIELD.to_string()),
            cloudinary,
            upload_timeout_secs: number("UNMARK_UPLOAD_TIMEOUT_SECS", UPLOAD_TIMEOUT_SECS),
            http_timeout_secs: number("UNMARK_HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS),
            max_video_size_mb: number("UNMARK_MAX_VIDEO_SIZE_MB", DEFAULT_MAX_VIDEO_SIZE_MB),
            fallback_order,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.upload_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "UNMARK_UPLOAD_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.http_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "UNMARK_HTTP_TIMEOUT_SECS must be greater than 0"
            ));
        }

        if self.max_video_size_mb == 0 {
            return Err(anyhow::anyhow!(
                "UNMARK_MAX_VIDEO_SIZE_MB must be greater than 0"
            ));
        }

        if self.max_video_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(anyhow::anyhow!(
                "UNMARK_MAX_VIDEO_SIZE_MB is too large: {}",
                self.max_video_size_mb
            ));
        }

        if self.cloudinary.is_none() && self.fallback_order.is_empty() {
            return Err(anyhow::anyhow!(
                "At least one hosting backend must be available"
            ));
        }

        if self.inference_input_field.is_empty() {
            return Err(anyhow::anyhow!(
                "UNMARK_INFERENCE_INPUT_FIELD must not be empty"
            ));
        }

        Ok(())
    }

    /// Full hosting order: Cloudinary first when configured, then the fallbacks.
    pub fn hosting_order(&self) -> Vec<HostingKind> {
        let mut order = Vec::with_capacity(self.fallback_order.len() + 1);
        if self.cloudinary.is_some() {
            order.push(HostingKind::Cloudinary);
        }
        order.extend(self.fallback_order.iter().copied());
        order
    }

    pub fn cloudinary(&self) -> Option<&CloudinaryConfig> {
        self.cloudinary.as_ref()
    }

    pub fn inference_api_key(&self) -> Option<&str> {
        self.inference_api_key.as_deref()
    }

    pub fn asset_limits(&self) -> AssetLimits {
        AssetLimits::from_megabytes(self.max_video_size_mb)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Config")
            .field(
                "inference_api_key",
                &self.inference_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("inference_v2_url", &self.inference_v2_url)
            .field("inference_v1_url", &self.inference_v1_url)
            .field("inference_input_field", &self.inference_input_field)
            .field("cloudinary", &self.cloudinary)
            .field("upload_timeout_secs", &self.upload_timeout_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("max_video_size_mb", &self.max_video_size_mb)
            .field("fallback_order", &self.fallback_order)
            .finish()
    }
}

/// Parse a comma-separated backend list, dropping duplicates and Cloudinary.
fn parse_fallback_order(list: &str) -> Result<Vec<HostingKind>, anyhow::Error> {
    let mut order = Vec::new();
    for entry in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind: HostingKind = entry.parse()?;
        if kind == HostingKind::Cloudinary {
            tracing::warn!(
                "Cloudinary is enabled through its credentials, ignoring it in UNMARK_HOSTING_BACKENDS"
            );
            continue;
        }
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    Ok(order)
}
