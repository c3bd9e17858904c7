//! Events emitted by a [`JobsMonitor`](crate::monitor::JobsMonitor).
//!
//! Broadcast on a [`tokio::sync::broadcast`] channel; call
//! [`JobsMonitor::subscribe`](crate::monitor::JobsMonitor::subscribe) to
//! receive them. Sending never blocks the monitor and events are dropped
//! when nobody listens.

use jobwatch_core::job::{JobProgress, JobStatus};
use jobwatch_core::types::{JobId, Timestamp};
use serde::Serialize;

/// A state change observed by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    /// A request for `job_ids` is about to be sent.
    CycleStarted { job_ids: Vec<JobId>, at: Timestamp },

    /// A tracked job changed.
    JobUpdated {
        job_id: JobId,
        status: JobStatus,
        ack_errors: u32,
        progress: JobProgress,
        at: Timestamp,
    },

    /// The endpoint could not be reached or answered non-2xx. Automatic
    /// polling has stopped.
    TransportFailed {
        /// Status code, when the server answered.
        status: Option<u16>,
        error: String,
        at: Timestamp,
    },

    /// The endpoint answered 200 with an error or unusable data.
    ApplicationError { message: String, at: Timestamp },

    /// Nothing is left to track.
    AllJobsFinished {
        /// Ids still pending. Empty after an application error as well.
        remaining: Vec<JobId>,
        at: Timestamp,
    },
}
