use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Hosting backend types
///
/// This enum names the public file-hosting services a video can be relayed through.
/// It's defined in core because it's used in configuration and to tag published URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostingKind {
    Cloudinary,
    ZeroX0,
    TmpFiles,
    FileIo,
    /// Externally supplied backend with no known URL quirks.
    Other,
}

impl HostingKind {
    /// Display name used in status messages and error reports.
    pub fn service_name(&self) -> &'static str {
        match self {
            HostingKind::Cloudinary => "Cloudinary",
            HostingKind::ZeroX0 => "0x0.st",
            HostingKind::TmpFiles => "tmpfiles.org",
            HostingKind::FileIo => "file.io",
            HostingKind::Other => "custom",
        }
    }

    /// Fallback order used when no explicit order is configured.
    ///
    /// Cloudinary is not part of it: it is prepended only when credentials exist.
    pub fn default_fallback_order() -> Vec<HostingKind> {
        vec![HostingKind::ZeroX0, HostingKind::TmpFiles, HostingKind::FileIo]
    }
}

impl FromStr for HostingKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cloudinary" => Ok(HostingKind::Cloudinary),
            "0x0" | "0x0.st" | "zerox0" => Ok(HostingKind::ZeroX0),
            "tmpfiles" | "tmpfiles.org" => Ok(HostingKind::TmpFiles),
            "fileio" | "file.io" => Ok(HostingKind::FileIo),
            _ => Err(anyhow::anyhow!("Invalid hosting backend: {}", s)),
        }
    }
}

impl Display for HostingKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.service_name())
    }
}
