//! Fallback publisher
//!
//! Walks the configured backends in order, one at a time. Each attempt races the
//! backend against the upload timeout; the first backend that returns a well-formed
//! absolute URL wins. Failed backends are logged and skipped, never retried.

use reqwest::Url;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use unmark_core::{error_chain, ErrorMetadata, LogLevel, PublicUrl, SourceAsset, StatusReporter};

use crate::traits::{HostingBackend, HostingError, HostingResult};

/// One backend that did not produce a URL
#[derive(Debug)]
pub struct BackendFailure {
    pub backend: String,
    pub error: HostingError,
}

/// A successful publish plus the failures that preceded it
#[derive(Debug)]
pub struct Published {
    pub url: PublicUrl,
    pub failures: Vec<BackendFailure>,
}

/// Every backend failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", failure_message(.attempted, .preferred_configured))]
pub struct PublishError {
    /// Backend names, in the order they were tried
    pub attempted: Vec<String>,
    /// One cause per attempted backend
    pub last_errors: Vec<String>,
    /// Whether the preferred backend (Cloudinary) was configured
    pub preferred_configured: bool,
}

impl PublishError {
    fn from_failures(failures: Vec<BackendFailure>, preferred_configured: bool) -> Self {
        let (attempted, last_errors) = failures
            .into_iter()
            .map(|f| (f.backend, f.error.to_string()))
            .unzip();

        Self {
            attempted,
            last_errors,
            preferred_configured,
        }
    }

    pub fn message(&self) -> String {
        failure_message(&self.attempted, &self.preferred_configured)
    }
}

fn failure_message(attempted: &[String], preferred_configured: &bool) -> String {
    let summary = if attempted.is_empty() {
        "Failed to upload video to temporary storage. No hosting services are available. "
            .to_string()
    } else {
        format!(
            "Failed to upload video to temporary storage after trying all {} hosting services ({}). ",
            attempted.len(),
            attempted.join(", ")
        )
    };

    let advice = if *preferred_configured {
        "Cloudinary upload failed and all fallback services failed. Please check your Cloudinary configuration."
    } else {
        "Please configure Cloudinary (UNMARK_CLOUDINARY_CLOUD_NAME and UNMARK_CLOUDINARY_UPLOAD_PRESET) for reliable uploads."
    };

    format!("{}{}", summary, advice)
}

impl ErrorMetadata for PublishError {
    fn error_code(&self) -> &'static str {
        "PUBLISH_FAILED"
    }

    fn is_recoverable(&self) -> bool {
        false
    }

    fn client_message(&self) -> String {
        self.message()
    }

    fn log_level(&self) -> LogLevel {
        LogLevel::Error
    }
}

/// Ordered list of hosting backends with a per-attempt timeout
pub struct Publisher {
    backends: Vec<Arc<dyn HostingBackend>>,
    timeout: Duration,
    preferred_configured: bool,
}

impl Publisher {
    pub fn new(backends: Vec<Arc<dyn HostingBackend>>, timeout: Duration) -> Self {
        Self {
            backends,
            timeout,
            preferred_configured: false,
        }
    }

    /// Record whether the preferred backend is part of the order (changes the failure advice).
    pub fn with_preferred_configured(mut self, configured: bool) -> Self {
        self.preferred_configured = configured;
        self
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Publish the asset at the first backend that succeeds.
    pub async fn publish(
        &self,
        asset: &SourceAsset,
        reporter: &dyn StatusReporter,
    ) -> Result<Published, PublishError> {
        let mut failures = Vec::new();

        for backend in &self.backends {
            let name = backend.name().to_string();
            reporter.report_status(&format!("Uploading to {}...", name));

            match self.attempt(backend.as_ref(), asset).await {
                Ok(url) => {
                    tracing::info!(
                        backend = %name,
                        url = %url,
                        failed_before = failures.len(),
                        "Asset published"
                    );
                    reporter.report_status(&format!("Uploaded to {} successfully", name));

                    return Ok(Published {
                        url: PublicUrl::new(url, name, backend.kind()),
                        failures,
                    });
                }
                Err(error) => {
                    tracing::warn!(
                        backend = %name,
                        error = %error_chain(&error),
                        error_code = error.error_code(),
                        "Hosting backend failed, trying next"
                    );
                    failures.push(BackendFailure {
                        backend: name,
                        error,
                    });
                }
            }
        }

        let error = PublishError::from_failures(failures, self.preferred_configured);
        tracing::error!(attempted = ?error.attempted, "All hosting backends failed");
        Err(error)
    }

    async fn attempt(
        &self,
        backend: &dyn HostingBackend,
        asset: &SourceAsset,
    ) -> HostingResult<String> {
        let raw = tokio::time::timeout(self.timeout, backend.submit(asset))
            .await
            .map_err(|_| HostingError::Timeout(self.timeout))??;

        validate_public_url(&raw)
    }
}

/// Accept only absolute http(s) URLs with a host.
pub fn validate_public_url(raw: &str) -> HostingResult<String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed)
        .map_err(|e| HostingError::InvalidUrl(format!("{} ({})", trimmed, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(HostingError::InvalidUrl(format!(
            "{} (unsupported scheme {})",
            trimmed,
            parsed.scheme()
        )));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(trimmed.to_string()),
        _ => Err(HostingError::InvalidUrl(format!("{} (missing host)", trimmed))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use unmark_core::{AssetLimits, HostingKind};

    enum Behavior {
        Succeed(&'static str),
        Fail,
        Hang,
    }

    struct FakeBackend {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HostingBackend for FakeBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> HostingKind {
            HostingKind::Other
        }

        async fn submit(&self, _asset: &SourceAsset) -> HostingResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Succeed(url) => Ok(url.to_string()),
                Behavior::Fail => Err(HostingError::Rejected {
                    status: 500,
                    message: format!("{} is down", self.name),
                }),
                Behavior::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        statuses: Mutex<Vec<String>>,
    }

    impl StatusReporter for RecordingReporter {
        fn report_status(&self, message: &str) {
            self.statuses.lock().unwrap().push(message.to_string());
        }
    }

    fn asset() -> SourceAsset {
        SourceAsset::new("clip.mp4", "video/mp4", vec![0u8; 32], &AssetLimits::default()).unwrap()
    }

    fn publisher(backends: Vec<Arc<FakeBackend>>) -> Publisher {
        let backends = backends
            .into_iter()
            .map(|b| b as Arc<dyn HostingBackend>)
            .collect();
        Publisher::new(backends, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_first_success_wins_after_failures() {
        let a = FakeBackend::new("a", Behavior::Fail);
        let b = FakeBackend::new("b", Behavior::Fail);
        let c = FakeBackend::new("c", Behavior::Succeed("https://c.example/v.mp4"));
        let d = FakeBackend::new("d", Behavior::Succeed("https://d.example/v.mp4"));
        let publisher = publisher(vec![a.clone(), b.clone(), c.clone(), d.clone()]);

        let published = publisher
            .publish(&asset(), &RecordingReporter::default())
            .await
            .unwrap();

        assert_eq!(published.url.as_str(), "https://c.example/v.mp4");
        assert_eq!(published.url.backend(), "c");
        assert_eq!(published.failures.len(), 2);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
        assert_eq!(c.calls(), 1);
        assert_eq!(d.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_moves_to_next_backend() {
        let slow = FakeBackend::new("slow", Behavior::Hang);
        let fast = FakeBackend::new("fast", Behavior::Succeed("https://host/dl/abc/video.mp4"));
        let publisher = publisher(vec![slow.clone(), fast.clone()]);
        let reporter = RecordingReporter::default();

        let published = publisher.publish(&asset(), &reporter).await.unwrap();

        assert_eq!(published.url.as_str(), "https://host/dl/abc/video.mp4");
        assert_eq!(published.failures.len(), 1);
        assert!(matches!(
            published.failures[0].error,
            HostingError::Timeout(_)
        ));
        assert_eq!(
            *reporter.statuses.lock().unwrap(),
            vec![
                "Uploading to slow...",
                "Uploading to fast...",
                "Uploaded to fast successfully"
            ]
        );
    }

    #[tokio::test]
    async fn test_all_failing_lists_every_attempt() {
        let publisher = publisher(vec![
            FakeBackend::new("a", Behavior::Fail),
            FakeBackend::new("b", Behavior::Fail),
            FakeBackend::new("c", Behavior::Fail),
        ]);

        let err = publisher
            .publish(&asset(), &RecordingReporter::default())
            .await
            .unwrap_err();

        assert_eq!(err.attempted, vec!["a", "b", "c"]);
        assert_eq!(err.last_errors.len(), 3);
        assert!(err.last_errors[1].contains("b is down"));
        assert!(err
            .to_string()
            .starts_with("Failed to upload video to temporary storage after trying all 3"));
        assert!(err.to_string().contains("Please configure Cloudinary"));
        assert!(!err.is_recoverable());
    }

    #[tokio::test]
    async fn test_malformed_url_counts_as_failure() {
        let bad = FakeBackend::new("bad", Behavior::Succeed("ftp://files.example/v.mp4"));
        let good = FakeBackend::new("good", Behavior::Succeed("https://good.example/v.mp4"));
        let publisher = publisher(vec![bad, good]);

        let published = publisher
            .publish(&asset(), &RecordingReporter::default())
            .await
            .unwrap();

        assert_eq!(published.url.backend(), "good");
        assert!(matches!(
            published.failures[0].error,
            HostingError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_preferred_advice() {
        let err = PublishError {
            attempted: vec!["Cloudinary".to_string(), "0x0.st".to_string()],
            last_errors: vec!["x".to_string(), "y".to_string()],
            preferred_configured: true,
        };
        assert!(err
            .message()
            .ends_with("Please check your Cloudinary configuration."));
        assert!(err.message().contains("(Cloudinary, 0x0.st)"));
    }

    #[test]
    fn test_publish_error_display_matches_message() {
        let err = PublishError {
            attempted: vec!["0x0.st".to_string()],
            last_errors: vec!["Upload timeout after 30 seconds".to_string()],
            preferred_configured: false,
        };
        assert_eq!(err.to_string(), err.message());
        assert!(err.to_string().starts_with(
            "Failed to upload video to temporary storage after trying all 1 hosting services (0x0.st). Please configure Cloudinary"
        ));
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_validate_public_url() {
        assert!(validate_public_url("https://a.example/x.mp4").is_ok());
        assert_eq!(
            validate_public_url(" http://a.example/x.mp4\n").unwrap(),
            "http://a.example/x.mp4"
        );
        assert!(validate_public_url("/relative/path").is_err());
        assert!(validate_public_url("mailto:someone@example.com").is_err());
        assert!(validate_public_url("").is_err());
    }
}
