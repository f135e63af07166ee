//! Session state behind a watermark-removal UI
//!
//! A session holds the selected asset, two ephemeral URL slots (preview and result),
//! and the latest status snapshot. Every selection and every run takes a new ticket;
//! updates and results from an older ticket are discarded, so the last invocation
//! wins. Dropping the session releases every URL it still owns.

use bytes::Bytes;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use unmark_core::{
    AssetLimits, Config, ErrorMetadata, InferenceResult, ObjectUrlStore, SourceAsset, UrlSlot,
};

use crate::error::PipelineError;
use crate::orchestrator::Pipeline;
use crate::status::{PipelineStatus, RunObserver, RunTracker};

const STATUS_SELECTED: &str = "File selected. Ready to remove watermark.";
const DOWNLOAD_PREFIX: &str = "watermark-removed-";

struct SessionState {
    selected: Option<SourceAsset>,
    preview: UrlSlot,
    result: UrlSlot,
    remote_result: Option<String>,
    ticket: u64,
}

impl SessionState {
    fn next_ticket(&mut self) -> u64 {
        self.ticket += 1;
        self.ticket
    }

    fn clear_result(&mut self) {
        self.result.clear();
        self.remote_result = None;
    }
}

struct Shared {
    state: Mutex<SessionState>,
    status: watch::Sender<PipelineStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish_status(&self, status: PipelineStatus) {
        self.status.send_replace(status);
    }
}

/// Forwards a run's updates to the session while the run is still the latest one.
struct TicketForwarder {
    ticket: u64,
    shared: Arc<Shared>,
}

impl RunObserver for TicketForwarder {
    fn on_status(&self, status: &PipelineStatus) {
        let current = self.shared.lock().ticket == self.ticket;
        if current {
            self.shared.publish_status(status.clone());
        }
    }
}

pub struct Session {
    pipeline: Arc<Pipeline>,
    store: ObjectUrlStore,
    limits: AssetLimits,
    shared: Arc<Shared>,
}

impl Session {
    pub fn new(pipeline: Arc<Pipeline>, store: ObjectUrlStore, limits: AssetLimits) -> Self {
        let (status, _) = watch::channel(PipelineStatus::default());
        Self {
            pipeline,
            store,
            limits,
            shared: Arc::new(Shared {
                state: Mutex::new(SessionState {
                    selected: None,
                    preview: UrlSlot::new("preview"),
                    result: UrlSlot::new("result"),
                    remote_result: None,
                    ticket: 0,
                }),
                status,
            }),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, PipelineError> {
        let store = ObjectUrlStore::new();
        let pipeline = Pipeline::from_config(config, store.clone())?;
        Ok(Self::new(Arc::new(pipeline), store, config.asset_limits()))
    }

    pub fn limits(&self) -> &AssetLimits {
        &self.limits
    }

    pub fn store(&self) -> &ObjectUrlStore {
        &self.store
    }

    /// Make `asset` the current selection. Returns the preview URL.
    pub fn select(&self, asset: SourceAsset) -> String {
        if self.shared.status.borrow().is_processing() {
            tracing::debug!("Selection supersedes the run in progress");
        }

        let mut state = self.shared.lock();
        state.next_ticket();
        state.clear_result();

        let preview_url = self.store.create(asset.data().clone(), asset.content_type());
        let preview = state.preview.replace(preview_url).as_str().to_string();

        tracing::debug!(asset = %asset.name(), bytes = asset.byte_len(), "File selected");
        state.selected = Some(asset);
        drop(state);

        self.shared.publish_status(PipelineStatus::idle(STATUS_SELECTED));
        preview
    }

    /// Validate an in-memory file and select it.
    pub fn select_bytes(
        &self,
        name: &str,
        content_type: &str,
        data: impl Into<Bytes>,
    ) -> Result<String, PipelineError> {
        match SourceAsset::new(name, content_type, data, &self.limits) {
            Ok(asset) => Ok(self.select(asset)),
            Err(e) => Err(self.reject_selection(e.into())),
        }
    }

    /// Validate a file on disk and select it.
    pub async fn select_file(&self, path: &Path) -> Result<String, PipelineError> {
        match SourceAsset::from_file(path, &self.limits).await {
            Ok(asset) => Ok(self.select(asset)),
            Err(e) => Err(self.reject_selection(e.into())),
        }
    }

    fn reject_selection(&self, error: PipelineError) -> PipelineError {
        tracing::debug!(error = %error, "File rejected");
        self.shared.publish_status(PipelineStatus::rejected(error.report()));
        error
    }

    /// Run the pipeline for the current selection.
    ///
    /// Returns the final status. A run overtaken by a newer selection or run yields
    /// `PipelineError::Superseded` and its result is released.
    pub async fn process(&self) -> Result<PipelineStatus, PipelineError> {
        let (ticket, asset) = {
            let mut state = self.shared.lock();
            let asset = match state.selected.clone() {
                Some(asset) => asset,
                None => {
                    drop(state);
                    let error = PipelineError::NoSelection;
                    self.shared.publish_status(PipelineStatus::rejected(error.report()));
                    return Err(error);
                }
            };
            state.clear_result();
            (state.next_ticket(), asset)
        };

        let tracker = RunTracker::new().with_observer(Arc::new(TicketForwarder {
            ticket,
            shared: self.shared.clone(),
        }));

        let outcome = self.pipeline.run_tracked(&asset, &tracker).await;
        self.complete_run(ticket, outcome, tracker.snapshot())
    }

    fn complete_run(
        &self,
        ticket: u64,
        outcome: Result<InferenceResult, PipelineError>,
        status: PipelineStatus,
    ) -> Result<PipelineStatus, PipelineError> {
        let mut state = self.shared.lock();
        if state.ticket != ticket {
            tracing::debug!(
                ticket,
                latest = state.ticket,
                "Discarding result of superseded run"
            );
            // Dropping the outcome releases any ephemeral URL it holds
            return Err(PipelineError::Superseded);
        }

        match outcome {
            Ok(InferenceResult::Blob(blob)) => {
                state.result.replace(blob.into_url());
            }
            Ok(InferenceResult::Url(url)) => {
                state.remote_result = Some(url);
            }
            Err(e) => {
                drop(state);
                self.shared.publish_status(status);
                return Err(e);
            }
        }
        drop(state);

        self.shared.publish_status(status.clone());
        Ok(status)
    }

    /// Latest status snapshot.
    pub fn status(&self) -> PipelineStatus {
        self.shared.status.borrow().clone()
    }

    /// Receiver that always sees the latest status.
    pub fn subscribe(&self) -> watch::Receiver<PipelineStatus> {
        self.shared.status.subscribe()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.shared
            .lock()
            .preview
            .current()
            .map(|u| u.as_str().to_string())
    }

    /// Playable address of the last result, local or remote.
    pub fn result_url(&self) -> Option<String> {
        let state = self.shared.lock();
        state
            .result
            .current()
            .map(|u| u.as_str().to_string())
            .or_else(|| state.remote_result.clone())
    }

    /// Bytes of a locally materialized result, for saving to disk.
    pub fn result_bytes(&self) -> Option<Bytes> {
        self.shared.lock().result.current().and_then(|u| u.bytes())
    }

    /// File name offered when the result is downloaded.
    pub fn download_file_name(&self) -> Option<String> {
        self.shared
            .lock()
            .selected
            .as_ref()
            .map(|asset| format!("{}{}", DOWNLOAD_PREFIX, asset.name()))
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.preview.clear();
        state.clear_result();
        state.selected = None;
        tracing::debug!("Session closed, ephemeral URLs released");
    }
}
