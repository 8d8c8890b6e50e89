//! Explicit finite-state object for the upload-and-poll workflow.
//!
//! All mutation goes through [`WorkflowState::apply`], a pure reducer over
//! [`WorkflowEvent`]s, so the state machine can be tested without any I/O.

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Uploading,
    Translating,
    Completed,
    Failed,
}

#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A new upload begins; any previously tracked job is forgotten.
    UploadStarted,
    /// Running upload percentage, 0..=100.
    UploadProgress(u8),
    Uploaded {
        file_path: String,
        initial_format: Option<String>,
    },
    JobStarted {
        translation_id: String,
    },
    /// One `in_progress` status observation.
    TickInProgress,
    /// A `pending` or unrecognized status observation; changes nothing.
    TickIgnored,
    /// The terminal `completed` observation.
    TickCompleted {
        download_url: String,
        preview_url: String,
        file_path: Option<String>,
    },
    /// One failed status fetch.
    PollError,
}

/// Sink for workflow events. The workflow wires this to the reducer; tests
/// can collect raw events instead.
pub type EventSink = Arc<dyn Fn(WorkflowEvent) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct WorkflowState {
    pub phase: Phase,
    pub upload_progress: u8,
    /// Synthetic progress: an elapsed-tick counter scaled by the configured
    /// increment, unrelated to server-side completion. Forced to exactly 100
    /// when the job completes.
    pub translation_progress: f64,
    pub job_id: Option<String>,
    pub file_path: Option<String>,
    pub initial_format: Option<String>,
    pub download_url: Option<String>,
    pub preview_url: Option<String>,
    pub consecutive_poll_errors: u32,

    progress_increment: f64,
    max_consecutive_errors: u32,
}

impl WorkflowState {
    pub fn new(progress_increment: f64, max_consecutive_errors: u32) -> Self {
        Self {
            phase: Phase::Idle,
            upload_progress: 0,
            translation_progress: 0.0,
            job_id: None,
            file_path: None,
            initial_format: None,
            download_url: None,
            preview_url: None,
            consecutive_poll_errors: 0,
            progress_increment,
            max_consecutive_errors,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Completed | Phase::Failed)
    }

    pub fn apply(&mut self, event: WorkflowEvent) {
        match event {
            WorkflowEvent::UploadStarted => {
                *self = Self::new(self.progress_increment, self.max_consecutive_errors);
                self.phase = Phase::Uploading;
            }
            WorkflowEvent::UploadProgress(pct) => {
                // Non-decreasing within one upload, clamped to 100.
                self.upload_progress = self.upload_progress.max(pct.min(100));
            }
            WorkflowEvent::Uploaded {
                file_path,
                initial_format,
            } => {
                self.file_path = Some(file_path);
                self.initial_format = initial_format;
            }
            WorkflowEvent::JobStarted { translation_id } => {
                self.phase = Phase::Translating;
                self.translation_progress = 0.0;
                self.job_id = Some(translation_id);
                self.download_url = None;
                self.preview_url = None;
                self.consecutive_poll_errors = 0;
            }
            // Tick events only have meaning while a job is being polled.
            WorkflowEvent::TickInProgress => {
                if self.phase != Phase::Translating {
                    return;
                }
                self.translation_progress += self.progress_increment;
                self.consecutive_poll_errors = 0;
            }
            WorkflowEvent::TickIgnored => {
                if self.phase != Phase::Translating {
                    return;
                }
                self.consecutive_poll_errors = 0;
            }
            WorkflowEvent::TickCompleted {
                download_url,
                preview_url,
                file_path,
            } => {
                if self.phase != Phase::Translating {
                    return;
                }
                self.phase = Phase::Completed;
                self.translation_progress = 100.0;
                self.download_url = Some(download_url);
                self.preview_url = Some(preview_url);
                if file_path.is_some() {
                    self.file_path = file_path;
                }
                self.consecutive_poll_errors = 0;
            }
            WorkflowEvent::PollError => {
                if self.phase != Phase::Translating {
                    return;
                }
                self.consecutive_poll_errors += 1;
                if self.consecutive_poll_errors >= self.max_consecutive_errors {
                    self.phase = Phase::Failed;
                }
            }
        }
    }
}
