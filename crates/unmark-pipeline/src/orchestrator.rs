//! Pipeline orchestrator
//!
//! Sequences Publisher → Remover for one asset. The run moves strictly through
//! Idle → Publishing → Submitting → Completed | Failed, and every failure is reduced
//! to a single user-facing message on the run's tracker.

use unmark_core::{
    error_chain, Config, ErrorMetadata, ErrorReport, InferenceResult, LogLevel, ObjectUrlStore,
    SourceAsset,
};
use unmark_hosting::{create_publisher, Publisher};
use unmark_http::HttpClient;
use unmark_inference::Remover;

use crate::error::PipelineError;
use crate::status::RunTracker;

pub struct Pipeline {
    publisher: Publisher,
    remover: Remover,
    credential: Option<String>,
}

impl Pipeline {
    pub fn new(publisher: Publisher, remover: Remover, credential: Option<String>) -> Self {
        Self {
            publisher,
            remover,
            credential,
        }
    }

    /// Build the publisher and remover from configuration, sharing one HTTP client.
    pub fn from_config(config: &Config, store: ObjectUrlStore) -> Result<Self, PipelineError> {
        config.validate()?;

        let http = HttpClient::from_config(config)?;
        let publisher = create_publisher(config, &http)?;
        let remover = Remover::from_config(config, http, store);

        tracing::info!(
            backends = ?publisher.backend_names(),
            endpoints = remover.endpoints().len(),
            credential_configured = config.inference_api_key().is_some(),
            "Pipeline configured"
        );

        Ok(Self::new(
            publisher,
            remover,
            config.inference_api_key().map(str::to_string),
        ))
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// Run the pipeline with a private tracker.
    pub async fn run(&self, asset: &SourceAsset) -> Result<InferenceResult, PipelineError> {
        self.run_tracked(asset, &RunTracker::new()).await
    }

    /// Run the pipeline, reporting progress on `tracker`.
    pub async fn run_tracked(
        &self,
        asset: &SourceAsset,
        tracker: &RunTracker,
    ) -> Result<InferenceResult, PipelineError> {
        let credential = match self.credential.as_deref() {
            Some(credential) => credential,
            None => {
                let error = PipelineError::MissingCredential;
                tracing::warn!("Run refused: inference credential missing");
                tracker.reject(error.report());
                return Err(error);
            }
        };

        tracing::info!(
            asset = %asset.name(),
            content_type = %asset.content_type(),
            bytes = asset.byte_len(),
            "Starting watermark removal"
        );
        tracker.begin();

        let published = match self.publisher.publish(asset, tracker).await {
            Ok(published) => published,
            Err(e) => return Err(Self::fail(tracker, e.into())),
        };
        tracing::debug!(
            url = %published.url,
            backend = %published.url.backend(),
            skipped = published.failures.len(),
            "Published source asset"
        );
        tracker.published();

        let result = match self.remover.remove(&published.url, credential, tracker).await {
            Ok(result) => result,
            Err(e) => return Err(Self::fail(tracker, e.into())),
        };

        tracker.complete(result.playable_url());
        tracing::info!(
            asset = %asset.name(),
            blob = result.is_blob(),
            "Watermark removal completed"
        );

        Ok(result)
    }

    fn fail(tracker: &RunTracker, error: PipelineError) -> PipelineError {
        let details = error_chain(&error);
        match error.log_level() {
            LogLevel::Debug => tracing::debug!(error_code = error.error_code(), error = %details, "Run failed"),
            LogLevel::Warn => tracing::warn!(error_code = error.error_code(), error = %details, "Run failed"),
            LogLevel::Error => tracing::error!(error_code = error.error_code(), error = %details, "Run failed"),
        }

        tracker.fail(ErrorReport::new(error.user_message(), error.is_recoverable()));
        error
    }
}
