//! Timer-driven polling.
//!
//! [`JobsMonitor::run`] fetches, sleeps for the configured delay and
//! fetches again until a cycle no longer asks to be rescheduled or the
//! [`CancellationToken`] is triggered. [`JobsMonitor::spawn`] moves the
//! monitor into a tokio task and hands back a [`MonitorHandle`] that
//! cancels the task when dropped.

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::monitor::{CycleOutcome, JobsMonitor};

/// What a finished polling task hands back: the monitor itself and the
/// last cycle outcome (`None` when the task was cancelled).
pub type TaskResult = (JobsMonitor, Option<CycleOutcome>);

impl JobsMonitor {
    /// Poll until a terminal outcome or cancellation.
    ///
    /// The first cycle runs immediately. The next one is scheduled only
    /// after the previous outcome has been processed, and only when it
    /// left jobs pending and the fetch delay is non-zero. Returns the last
    /// outcome, or `None` if `cancel` fired first.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Option<CycleOutcome> {
        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                outcome = self.fetch() => Some(outcome),
            };

            let Some(outcome) = outcome else {
                self.abandon_cycle();
                tracing::info!(url = %self.url(), "Polling cancelled");
                return None;
            };

            if !outcome.should_reschedule() {
                tracing::debug!(url = %self.url(), ?outcome, "Polling stopped");
                return Some(outcome);
            }

            let Some(delay) = self.fetch_delay_duration() else {
                return Some(outcome);
            };

            tracing::debug!(delay_ms = delay.as_millis() as u64, "Next fetch scheduled");

            // Wait before the next cycle, respecting cancellation.
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(url = %self.url(), "Polling cancelled");
                    return None;
                }
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Move the monitor into a background task that runs [`run`](Self::run).
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(mut self) -> MonitorHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = tokio::spawn(async move {
            tracing::info!(url = %self.url(), "Starting jobs monitor");
            let outcome = self.run(&token).await;
            tracing::info!(url = %self.url(), "Jobs monitor exited");
            (self, outcome)
        });

        MonitorHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Owned handle to a spawned monitor. Dropping it cancels the task.
pub struct MonitorHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<TaskResult>>,
}

impl MonitorHandle {
    /// Token that stops the task when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Wait for the task to stop on its own.
    pub async fn join(mut self) -> Result<TaskResult, JoinError> {
        match self.task.take() {
            Some(task) => task.await,
            None => unreachable!("task is only taken by join/stop, which consume the handle"),
        }
    }

    /// Cancel the task and wait for it to hand the monitor back.
    pub async fn stop(self) -> Result<TaskResult, JoinError> {
        self.cancel.cancel();
        self.join().await
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
