use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::hosting_types::HostingKind;

/// A URL at which a hosting backend published the asset.
///
/// Tagged with the backend that produced it, because URL-shape transforms
/// depend on which service issued the address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicUrl {
    url: String,
    backend: String,
    kind: HostingKind,
}

impl PublicUrl {
    pub fn new(url: impl Into<String>, backend: impl Into<String>, kind: HostingKind) -> Self {
        Self {
            url: url.into(),
            backend: backend.into(),
            kind,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Name of the backend that published the asset
    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn kind(&self) -> HostingKind {
        self.kind
    }

    /// Same origin, different address.
    pub fn with_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            backend: self.backend.clone(),
            kind: self.kind,
        }
    }
}

impl Display for PublicUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.url)
    }
}
