//! The upload-and-poll workflow: submit a document, start a translation job
//! for it, and poll the job to a terminal state.

mod poller;
mod state;

pub use poller::{PollOutcome, StatusPoller};
pub use state::{EventSink, Phase, WorkflowEvent, WorkflowState};

use crate::config::{ClientConfig, PollerSettings, UploadSettings};
use crate::error::ClientError;
use crate::services::api::TranslationApi;
use crate::services::upload::ProgressSink;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;

/// Drives the whole workflow and publishes [`WorkflowState`] snapshots.
///
/// At most one job is tracked per instance: starting a new upload cancels the
/// polling loop of any previous job before anything is sent to the backend.
pub struct TranslationWorkflow {
    api: Arc<TranslationApi>,
    poller: PollerSettings,
    upload: UploadSettings,
    state_tx: Arc<watch::Sender<WorkflowState>>,
    active_poll: Mutex<Option<CancellationToken>>,
}

impl TranslationWorkflow {
    pub fn new(api: Arc<TranslationApi>, config: &ClientConfig) -> Self {
        let initial = WorkflowState::new(
            config.poller.progress_increment,
            config.poller.max_consecutive_errors,
        );
        let (state_tx, _) = watch::channel(initial);

        Self {
            api,
            poller: config.poller.clone(),
            upload: config.upload.clone(),
            state_tx: Arc::new(state_tx),
            active_poll: Mutex::new(None),
        }
    }

    /// Observe state snapshots as the workflow progresses.
    pub fn subscribe(&self) -> watch::Receiver<WorkflowState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> WorkflowState {
        self.state_tx.borrow().clone()
    }

    fn emit(&self, event: WorkflowEvent) {
        self.state_tx.send_modify(|state| state.apply(event));
    }

    pub async fn translate_file(&self, path: &Path) -> Result<PollOutcome, ClientError> {
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.bin");
        self.translate_bytes(file_name, data).await
    }

    /// Run the workflow end to end: upload, start the job, poll to a
    /// terminal outcome.
    pub async fn translate_bytes(
        &self,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<PollOutcome, ClientError> {
        if data.is_empty() {
            return Err(ClientError::EmptyFile);
        }
        let size = data.len() as u64;
        if size > self.upload.max_file_size {
            return Err(ClientError::FileTooLarge {
                size,
                limit: self.upload.max_file_size,
            });
        }

        // One tracked job at a time: stop any stale polling loop before the
        // new upload is submitted.
        let cancel = CancellationToken::new();
        if let Some(stale) = self.active_poll.lock().await.replace(cancel.clone()) {
            stale.cancel();
        }

        self.emit(WorkflowEvent::UploadStarted);
        metrics::counter!("translation_uploads_started").increment(1);

        let progress: ProgressSink = {
            let state_tx = self.state_tx.clone();
            Arc::new(move |pct| {
                state_tx.send_modify(|state| state.apply(WorkflowEvent::UploadProgress(pct)));
            })
        };

        let uploaded = self
            .api
            .upload(file_name, data, self.upload.chunk_size, progress)
            .await?;
        let file_path = uploaded.file_path.ok_or(ClientError::MissingFilePath)?;
        self.emit(WorkflowEvent::Uploaded {
            file_path: file_path.clone(),
            initial_format: uploaded.initial_format.clone(),
        });

        let started = self
            .api
            .start_translation(&file_path, uploaded.initial_format.as_deref())
            .await?;
        self.emit(WorkflowEvent::JobStarted {
            translation_id: started.translation_id.clone(),
        });

        let events: EventSink = {
            let state_tx = self.state_tx.clone();
            Arc::new(move |event| {
                state_tx.send_modify(|state| state.apply(event));
            })
        };

        let poller = StatusPoller::new(self.api.clone(), &self.poller);
        let outcome = poller.run(&started.translation_id, events, cancel).await;
        Ok(outcome)
    }
}
