use crate::{
    CloudinaryBackend, FileIoBackend, HostingBackend, HostingError, HostingResult, Publisher,
    TmpFilesBackend, ZeroX0Backend,
};
use std::sync::Arc;
use unmark_core::{Config, HostingKind};
use unmark_http::HttpClient;

/// Create the hosting backends in configured order
pub fn create_backends(
    config: &Config,
    http: &HttpClient,
) -> HostingResult<Vec<Arc<dyn HostingBackend>>> {
    config
        .hosting_order()
        .into_iter()
        .map(|kind| create_backend(kind, config, http))
        .collect()
}

fn create_backend(
    kind: HostingKind,
    config: &Config,
    http: &HttpClient,
) -> HostingResult<Arc<dyn HostingBackend>> {
    match kind {
        HostingKind::Cloudinary => {
            let cloudinary = config.cloudinary().ok_or_else(|| {
                HostingError::ConfigError(
                    "UNMARK_CLOUDINARY_CLOUD_NAME and UNMARK_CLOUDINARY_UPLOAD_PRESET not configured"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(CloudinaryBackend::new(http.clone(), cloudinary)))
        }
        HostingKind::ZeroX0 => Ok(Arc::new(ZeroX0Backend::new(http.clone()))),
        HostingKind::TmpFiles => Ok(Arc::new(TmpFilesBackend::new(http.clone()))),
        HostingKind::FileIo => Ok(Arc::new(FileIoBackend::new(http.clone()))),
        HostingKind::Other => Err(HostingError::ConfigError(
            "Custom hosting backends must be constructed directly".to_string(),
        )),
    }
}

/// Create a publisher over the configured backends
pub fn create_publisher(config: &Config, http: &HttpClient) -> HostingResult<Publisher> {
    let backends = create_backends(config, http)?;
    let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
    tracing::debug!(backends = ?names, timeout_secs = config.upload_timeout_secs, "Hosting order");

    Ok(Publisher::new(backends, config.upload_timeout())
        .with_preferred_configured(config.cloudinary().is_some()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use unmark_core::CloudinaryConfig;

    fn http() -> HttpClient {
        HttpClient::new(Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_default_order() {
        let publisher = create_publisher(&Config::default(), &http()).unwrap();
        assert_eq!(
            publisher.backend_names(),
            vec!["0x0.st", "tmpfiles.org", "file.io"]
        );
        assert_eq!(publisher.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_cloudinary_first_when_configured() {
        let config = Config {
            cloudinary: Some(CloudinaryConfig {
                cloud_name: "demo".to_string(),
                upload_preset: "preset".to_string(),
            }),
            ..Config::default()
        };

        let backends = create_backends(&config, &http()).unwrap();
        assert_eq!(backends.len(), 4);
        assert_eq!(backends[0].kind(), HostingKind::Cloudinary);
    }

    #[test]
    fn test_custom_order() {
        let config = Config {
            fallback_order: vec![HostingKind::FileIo],
            ..Config::default()
        };

        let backends = create_backends(&config, &http()).unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends[0].name(), "file.io");
    }
}
