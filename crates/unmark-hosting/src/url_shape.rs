//! URL-shape transforms per hosting service
//!
//! Only tmpfiles.org has two shapes. URLs from every other service pass through.

use unmark_core::{HostingKind, PublicUrl};

use crate::tmpfiles;

fn has_two_shapes(url: &PublicUrl) -> bool {
    match url.kind() {
        HostingKind::TmpFiles => true,
        HostingKind::Other => tmpfiles::is_tmpfiles_url(url.as_str()),
        _ => false,
    }
}

/// The shape the inference service should receive first.
pub fn prepare_for_inference(url: &PublicUrl) -> PublicUrl {
    if !has_two_shapes(url) {
        return url.clone();
    }

    let prepared = tmpfiles::download_url(url.as_str());
    if prepared != url.as_str() {
        tracing::debug!(
            backend = %url.backend(),
            from = %url,
            to = %prepared,
            "Converted URL to download format"
        );
    }
    url.with_url(prepared)
}

/// The other shape of the same upload, if the service has one.
pub fn alternate_shape(url: &PublicUrl) -> Option<PublicUrl> {
    if !has_two_shapes(url) {
        return None;
    }

    let alternate = tmpfiles::toggle_shape(url.as_str());
    (alternate != url.as_str()).then(|| url.with_url(alternate))
}
