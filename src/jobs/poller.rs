use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::types::{TaskState, TaskStatus};
use crate::client::BackendClient;

/// How a polled analysis job ended.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(TaskStatus),
    Failed { task_id: String, error: String },
    Cancelled,
}

/// Polls the job-status endpoint on a fixed interval until the job settles.
///
/// Each tick waits for its status request to finish before the next tick is
/// taken, and ticks missed while waiting are skipped, so at most one request
/// is in flight per poller.
pub struct JobPoller {
    client: BackendClient,
    interval: Duration,
}

impl JobPoller {
    pub fn new(client: BackendClient, interval: Duration) -> Self {
        Self { client, interval }
    }

    /// Poll `task_id` until it completes, fails or `cancel` fires.
    ///
    /// Cancellation is observed between ticks. A status request already sent
    /// is allowed to finish, so no request is left in flight once this returns.
    pub async fn run<F>(
        &self,
        task_id: &str,
        cancel: CancellationToken,
        mut on_progress: F,
    ) -> JobOutcome
    where
        F: FnMut(&TaskStatus),
    {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(task_id, "Job polling cancelled");
                    return JobOutcome::Cancelled;
                }
                _ = ticker.tick() => {}
            }

            let status = match self.client.task_status(task_id).await {
                Ok(status) => status,
                Err(e) => {
                    // Transient: try again on the next tick.
                    tracing::warn!(task_id, error = %e, "Polling error");
                    continue;
                }
            };

            tracing::debug!(
                task_id,
                state = status.status.as_str(),
                progress = status.progress,
                processed = status.processed_records,
                total = status.total_records,
                "Job status"
            );
            on_progress(&status);

            match status.status {
                TaskState::Completed => {
                    tracing::info!(task_id, records = status.total_records, "Analysis complete");
                    return JobOutcome::Completed(status);
                }
                TaskState::Failed => {
                    let error = status
                        .error
                        .clone()
                        .unwrap_or_else(|| "unknown error".to_string());
                    tracing::error!(task_id, %error, "Analysis failed");
                    return JobOutcome::Failed {
                        task_id: task_id.to_string(),
                        error,
                    };
                }
                TaskState::Pending | TaskState::Processing | TaskState::Unknown => {}
            }
        }
    }
}
