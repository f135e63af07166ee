//! Ephemeral local URLs
//!
//! Binary results and file previews are exposed to the UI as `blob:` style URLs that
//! point at bytes held in memory. An `ObjectUrl` is the owning handle for one such
//! URL: dropping it revokes the URL, so each allocation is released exactly once.
//! A `UrlSlot` holds at most one live URL and revokes the previous one on replacement.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const OBJECT_URL_PREFIX: &str = "blob:unmark/";

/// Process-local registry of ephemeral URLs.
///
/// Cloning the store shares the same registry.
#[derive(Clone, Default)]
pub struct ObjectUrlStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl ObjectUrlStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Bytes>> {
        self.objects.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Allocate a new URL for `bytes`. The URL lives as long as the returned handle.
    pub fn create(&self, bytes: Bytes, content_type: impl Into<String>) -> ObjectUrl {
        let url = format!("{}{}", OBJECT_URL_PREFIX, Uuid::new_v4());
        let len = bytes.len();
        let content_type = content_type.into();

        self.lock().insert(url.clone(), bytes);

        tracing::debug!(url = %url, bytes = len, "Allocated object URL");

        ObjectUrl {
            url,
            len,
            content_type,
            store: self.clone(),
        }
    }

    /// Bytes behind a live URL, or `None` once it has been revoked.
    pub fn resolve(&self, url: &str) -> Option<Bytes> {
        self.lock().get(url).cloned()
    }

    /// Number of live URLs.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn revoke(&self, url: &str) -> bool {
        let removed = self.lock().remove(url).is_some();
        if removed {
            tracing::debug!(url = %url, "Revoked object URL");
        }
        removed
    }
}

impl Debug for ObjectUrlStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ObjectUrlStore")
            .field("live", &self.len())
            .finish()
    }
}

/// Owning handle for one ephemeral URL. Revokes the URL on drop.
pub struct ObjectUrl {
    url: String,
    len: usize,
    content_type: String,
    store: ObjectUrlStore,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Length of the payload behind the URL
    pub fn byte_len(&self) -> usize {
        self.len
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Payload behind the URL. Always `Some` while the handle is alive.
    pub fn bytes(&self) -> Option<Bytes> {
        self.store.resolve(&self.url)
    }
}

impl Drop for ObjectUrl {
    fn drop(&mut self) {
        self.store.revoke(&self.url);
    }
}

impl Debug for ObjectUrl {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ObjectUrl")
            .field("url", &self.url)
            .field("len", &self.len)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Holds at most one live `ObjectUrl` (e.g. the preview of the selected file).
#[derive(Debug)]
pub struct UrlSlot {
    name: &'static str,
    current: Option<ObjectUrl>,
}

impl UrlSlot {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            current: None,
        }
    }

    /// Install `url`, revoking whatever the slot held before.
    pub fn replace(&mut self, url: ObjectUrl) -> &ObjectUrl {
        if let Some(previous) = self.current.take() {
            tracing::debug!(slot = self.name, url = %previous.as_str(), "Releasing superseded URL");
        }
        self.current.insert(url)
    }

    /// Revoke the held URL, if any.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&ObjectUrl> {
        self.current.as_ref()
    }
}
