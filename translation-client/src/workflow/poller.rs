//! Fixed-cadence status polling for a translation job.

use crate::config::PollerSettings;
use crate::models::JobStatus;
use crate::services::api::TranslationApi;
use crate::workflow::state::{EventSink, WorkflowEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Terminal outcome of one polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed {
        download_url: String,
        preview_url: String,
        file_path: Option<String>,
    },
    Failed {
        consecutive_errors: u32,
    },
    Cancelled,
}

pub struct StatusPoller {
    api: Arc<TranslationApi>,
    interval: Duration,
    max_consecutive_errors: u32,
}

impl StatusPoller {
    pub fn new(api: Arc<TranslationApi>, settings: &PollerSettings) -> Self {
        Self {
            api,
            interval: settings.interval(),
            max_consecutive_errors: settings.max_consecutive_errors,
        }
    }

    /// Poll the job until it completes, fails, or is cancelled.
    ///
    /// Ticks are strictly sequential: the next status request is dispatched
    /// only after the previous response or error has been observed. The first
    /// observation happens one full interval after the loop starts.
    ///
    /// A failed status fetch is logged and masked, as long as failures do not
    /// pile up: the configured number of consecutive errors ends the loop
    /// with [`PollOutcome::Failed`]. Any successful observation resets the
    /// counter. Once `completed` is observed it is delivered to `events` and
    /// no further requests are issued.
    pub async fn run(
        &self,
        translation_id: &str,
        events: EventSink,
        cancel: CancellationToken,
    ) -> PollOutcome {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut consecutive_errors = 0u32;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(translation_id = %translation_id, "Polling cancelled");
                    metrics::counter!("translation_polls_cancelled").increment(1);
                    return PollOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            let fetched = self.api.translation_status(translation_id).await;

            // The token may have been cancelled while the request was in
            // flight; a stale loop must not report into a newer job's state.
            if cancel.is_cancelled() {
                tracing::info!(translation_id = %translation_id, "Polling cancelled");
                metrics::counter!("translation_polls_cancelled").increment(1);
                return PollOutcome::Cancelled;
            }

            match fetched {
                Ok(observed) => {
                    consecutive_errors = 0;
                    tracing::debug!(
                        translation_id = %translation_id,
                        status = ?observed.status,
                        "Translation status observed"
                    );

                    match observed.status {
                        JobStatus::InProgress => events(WorkflowEvent::TickInProgress),
                        JobStatus::Completed => {
                            let download_url = self.api.download_url(translation_id);
                            let preview_url = self.api.preview_url(translation_id);
                            events(WorkflowEvent::TickCompleted {
                                download_url: download_url.clone(),
                                preview_url: preview_url.clone(),
                                file_path: observed.file_path.clone(),
                            });

                            tracing::info!(
                                translation_id = %translation_id,
                                download_url = %download_url,
                                "Translation completed"
                            );
                            metrics::counter!("translation_jobs_completed").increment(1);

                            return PollOutcome::Completed {
                                download_url,
                                preview_url,
                                file_path: observed.file_path,
                            };
                        }
                        JobStatus::Pending | JobStatus::Unknown => {
                            events(WorkflowEvent::TickIgnored)
                        }
                    }
                }
                Err(e) => {
                    consecutive_errors += 1;
                    tracing::warn!(
                        translation_id = %translation_id,
                        error = %e,
                        consecutive_errors,
                        "Status poll failed"
                    );
                    events(WorkflowEvent::PollError);

                    if consecutive_errors >= self.max_consecutive_errors {
                        tracing::error!(
                            translation_id = %translation_id,
                            consecutive_errors,
                            "Giving up on translation job after repeated poll failures"
                        );
                        metrics::counter!("translation_jobs_failed").increment(1);
                        return PollOutcome::Failed { consecutive_errors };
                    }
                }
            }
        }
    }
}
