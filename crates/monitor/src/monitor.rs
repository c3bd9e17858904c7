//! The job-status monitor.
//!
//! [`JobsMonitor`] owns a [`JobsContainer`] and runs polling cycles
//! against a jobs endpoint. One cycle:
//!
//! 1. collect the ids of every non-terminal job (no ids, no request);
//! 2. `GET url?id=..&id=..` through the [`JobsTransport`];
//! 3. on transport failure show `HTTP server error` and stop;
//! 4. on `{"error": ..}` show the message and report all jobs finished;
//! 5. otherwise apply the records, hide the banner and either report all
//!    jobs finished or leave the monitor idle for the next cycle.
//!
//! Cycles never overlap because [`JobsMonitor::fetch`] takes `&mut self`.
//! Timer-driven polling lives in [`crate::task`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use jobwatch_core::banner::{HTTP_SERVER_ERROR_MESSAGE, INVALID_JOB_DATA_MESSAGE};
use jobwatch_core::container::JobsContainer;
use jobwatch_core::job::JobRecord;
use jobwatch_core::job_set::ApplyResult;
use jobwatch_core::payload::{parse_status_body, StatusPayload};
use jobwatch_core::types::JobId;
use tokio::sync::broadcast;

use crate::events::MonitorEvent;
use crate::transport::{JobsTransport, TransportError};
use crate::view::{JobsView, NullView};

/// Delay between two timer-driven cycles unless configured otherwise.
pub const DEFAULT_FETCH_DELAY_MS: u64 = 5000;

/// Broadcast channel capacity for monitor events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Single-slot callback invoked when nothing is left to track.
pub type FinishedCallback = Box<dyn FnMut(&[JobId]) + Send>;

/// Position of the monitor in its polling state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Waiting for the next cycle.
    Idle,
    /// A request is in flight.
    Polling,
    /// Every job is terminal, or the endpoint reported an application
    /// error. Terminal.
    AllFinished,
    /// The endpoint could not be reached. Terminal; the banner is shown.
    Errored,
}

impl MonitorState {
    pub fn is_terminal(self) -> bool {
        matches!(self, MonitorState::AllFinished | MonitorState::Errored)
    }
}

/// What a single call to [`JobsMonitor::fetch`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No job was pending; no request was sent.
    Skipped,
    /// Records were applied and these jobs are still pending.
    Pending { remaining: Vec<JobId> },
    /// Records were applied and every job is now terminal.
    AllFinished,
    /// The request failed or the endpoint answered non-2xx.
    TransportFailed { status: Option<u16> },
    /// The endpoint answered with an error message or unusable data.
    ApplicationError { message: String },
}

impl CycleOutcome {
    /// Only a cycle that left jobs pending asks for another one.
    pub fn should_reschedule(&self) -> bool {
        matches!(self, CycleOutcome::Pending { .. })
    }
}

/// Polls a jobs endpoint and keeps a container of jobs up to date.
pub struct JobsMonitor {
    url: String,
    container: JobsContainer,
    fetch_delay_ms: u64,
    state: MonitorState,
    transport: Arc<dyn JobsTransport>,
    view: Box<dyn JobsView>,
    on_all_jobs_finished: Option<FinishedCallback>,
    event_tx: broadcast::Sender<MonitorEvent>,
}

impl JobsMonitor {
    /// Bind a monitor to `url` and the jobs held in `container`.
    ///
    /// Updates are discarded until a view is attached with
    /// [`with_view`](Self::with_view).
    pub fn new(
        url: impl Into<String>,
        container: JobsContainer,
        transport: Arc<dyn JobsTransport>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            url: url.into(),
            container,
            fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
            state: MonitorState::Idle,
            transport,
            view: Box::new(NullView),
            on_all_jobs_finished: None,
            event_tx,
        }
    }

    pub fn with_view(mut self, view: impl JobsView + 'static) -> Self {
        self.view = Box::new(view);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The container this monitor is bound to.
    pub fn element(&self) -> &JobsContainer {
        &self.container
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// Delay between timer-driven cycles, in milliseconds.
    pub fn fetch_delay(&self) -> u64 {
        self.fetch_delay_ms
    }

    /// Set the delay between timer-driven cycles. `0` turns automatic
    /// rescheduling off; cycles then only run through [`fetch`](Self::fetch).
    pub fn set_fetch_delay(&mut self, delay_ms: u64) -> &mut Self {
        self.fetch_delay_ms = delay_ms;
        self
    }

    /// The delay as a [`Duration`], or `None` when rescheduling is off.
    pub fn fetch_delay_duration(&self) -> Option<Duration> {
        (self.fetch_delay_ms > 0).then(|| Duration::from_millis(self.fetch_delay_ms))
    }

    /// Register the callback run when nothing is left to track. Replaces
    /// any previously registered callback.
    pub fn on_all_jobs_finished<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnMut(&[JobId]) + Send + 'static,
    {
        self.on_all_jobs_finished = Some(Box::new(callback));
        self
    }

    pub fn has_finished_callback(&self) -> bool {
        self.on_all_jobs_finished.is_some()
    }

    /// Subscribe to monitor events.
    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.event_tx.subscribe()
    }

    /// Run one polling cycle now.
    ///
    /// Never fails: every error is reflected in the banner, the view,
    /// the event channel and the returned outcome.
    pub async fn fetch(&mut self) -> CycleOutcome {
        let ids = self.container.jobs.pending_ids();
        if ids.is_empty() {
            tracing::debug!(url = %self.url, "No pending jobs, skipping fetch");
            return CycleOutcome::Skipped;
        }

        self.state = MonitorState::Polling;
        tracing::debug!(url = %self.url, pending = ids.len(), "Fetching job statuses");
        self.emit(MonitorEvent::CycleStarted {
            job_ids: ids.clone(),
            at: Utc::now(),
        });

        let transport = Arc::clone(&self.transport);
        let body = match transport.fetch_statuses(&self.url, &ids).await {
            Ok(body) => body,
            Err(e) => return self.handle_transport_error(e),
        };

        match parse_status_body(&body) {
            Ok(StatusPayload::Records(records)) => self.handle_records(&records),
            Ok(StatusPayload::Error(message)) => self.handle_application_error(message),
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Unusable jobs payload");
                self.handle_application_error(INVALID_JOB_DATA_MESSAGE.to_string())
            }
        }
    }

    /// Put a monitor whose cycle was dropped mid-request back to idle.
    pub(crate) fn abandon_cycle(&mut self) {
        if self.state == MonitorState::Polling {
            self.state = MonitorState::Idle;
        }
    }

    // ---- cycle outcomes ----

    fn handle_records(&mut self, records: &[JobRecord]) -> CycleOutcome {
        let now = Utc::now();

        for record in records {
            match self.container.jobs.apply(record, now) {
                ApplyResult::Updated => {
                    tracing::debug!(
                        job_id = %record.id,
                        status = %record.status,
                        percentage = ?record.progress.percentage,
                        "Job updated",
                    );
                    self.view
                        .update_status(&record.id, record.status, record.ack_errors);
                    self.view.update_progress(&record.id, &record.progress);
                    self.emit(MonitorEvent::JobUpdated {
                        job_id: record.id.clone(),
                        status: record.status,
                        ack_errors: record.ack_errors,
                        progress: record.progress.clone(),
                        at: now,
                    });
                }
                ApplyResult::Unchanged => {}
                ApplyResult::UnknownJob => {
                    tracing::debug!(job_id = %record.id, "Ignoring record for untracked job");
                }
            }
        }

        if self.container.banner.is_visible() {
            self.container.banner.hide();
            self.view.hide_error();
        }

        let remaining = self.container.jobs.pending_ids();
        if remaining.is_empty() {
            tracing::info!(url = %self.url, "All jobs finished");
            self.state = MonitorState::AllFinished;
            self.finish(Vec::new());
            CycleOutcome::AllFinished
        } else {
            self.state = MonitorState::Idle;
            CycleOutcome::Pending { remaining }
        }
    }

    fn handle_application_error(&mut self, message: String) -> CycleOutcome {
        tracing::warn!(url = %self.url, error = %message, "Jobs endpoint reported an error");

        self.container.banner.show(message.clone());
        self.view.show_error(&message);
        self.emit(MonitorEvent::ApplicationError {
            message: message.clone(),
            at: Utc::now(),
        });

        // Terminal, with nothing reported as still running.
        self.state = MonitorState::AllFinished;
        self.finish(Vec::new());

        CycleOutcome::ApplicationError { message }
    }

    fn handle_transport_error(&mut self, error: TransportError) -> CycleOutcome {
        let status = error.status();
        tracing::error!(url = %self.url, ?status, error = %error, "Failed to fetch job statuses");

        self.container.banner.show(HTTP_SERVER_ERROR_MESSAGE);
        self.view.show_error(HTTP_SERVER_ERROR_MESSAGE);
        self.emit(MonitorEvent::TransportFailed {
            status,
            error: error.to_string(),
            at: Utc::now(),
        });

        self.state = MonitorState::Errored;
        CycleOutcome::TransportFailed { status }
    }

    fn finish(&mut self, remaining: Vec<JobId>) {
        if let Some(callback) = self.on_all_jobs_finished.as_mut() {
            callback(&remaining);
        }
        self.emit(MonitorEvent::AllJobsFinished {
            remaining,
            at: Utc::now(),
        });
    }

    fn emit(&self, event: MonitorEvent) {
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.event_tx.send(event);
    }
}

impl std::fmt::Debug for JobsMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobsMonitor")
            .field("url", &self.url)
            .field("container", &self.container)
            .field("fetch_delay_ms", &self.fetch_delay_ms)
            .field("state", &self.state)
            .field("has_finished_callback", &self.has_finished_callback())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
