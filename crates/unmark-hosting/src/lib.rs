//! Unmark Hosting Library
//!
//! This crate makes a local video reachable at a public URL. It defines the
//! `HostingBackend` trait, implementations for Cloudinary, 0x0.st, tmpfiles.org and
//! file.io, and the `Publisher` that walks an ordered list of backends until one
//! succeeds.
//!
//! # URL shapes
//!
//! Some services hand out more than one address for the same upload (tmpfiles.org
//! has a landing-page form and a `/dl/` download form). The per-backend transforms
//! live next to each backend; `url_shape` picks the right one for a `PublicUrl`.
//! The publisher never rewrites URLs itself.

pub mod cloudinary;
pub mod factory;
pub mod file_io;
pub(crate) mod multipart;
pub mod publisher;
pub mod tmpfiles;
pub mod traits;
pub mod url_shape;
pub mod zerox0;

// Re-export commonly used types
pub use cloudinary::CloudinaryBackend;
pub use factory::{create_backends, create_publisher};
pub use file_io::FileIoBackend;
pub use publisher::{BackendFailure, PublishError, Published, Publisher};
pub use tmpfiles::TmpFilesBackend;
pub use traits::{HostingBackend, HostingError, HostingResult};
pub use unmark_core::HostingKind;
pub use zerox0::ZeroX0Backend;
