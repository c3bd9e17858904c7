//! Rendering collaborators.
//!
//! The monitor keeps the job view-models itself and pushes every change
//! through a [`JobsView`], which decides how it is shown. The banner
//! calls mirror the container's [`Banner`](jobwatch_core::banner::Banner).

use jobwatch_core::job::{JobProgress, JobStatus};

/// Receives rendering updates from the monitor.
pub trait JobsView: Send {
    /// A job's status or unacknowledged error count changed.
    fn update_status(&mut self, job_id: &str, status: JobStatus, ack_errors: u32);

    /// A job's progress bar or label changed.
    fn update_progress(&mut self, job_id: &str, progress: &JobProgress);

    /// Reveal the banner with `message`.
    fn show_error(&mut self, message: &str);

    /// Hide the banner.
    fn hide_error(&mut self);
}

/// Discards every update.
#[derive(Debug, Default)]
pub struct NullView;

impl JobsView for NullView {
    fn update_status(&mut self, _job_id: &str, _status: JobStatus, _ack_errors: u32) {}
    fn update_progress(&mut self, _job_id: &str, _progress: &JobProgress) {}
    fn show_error(&mut self, _message: &str) {}
    fn hide_error(&mut self) {}
}

/// Renders updates as structured log lines. Used by the `jobwatch`
/// daemon where there is no screen to draw on.
#[derive(Debug, Default)]
pub struct LogView {
    banner_visible: bool,
}

impl JobsView for LogView {
    fn update_status(&mut self, job_id: &str, status: JobStatus, ack_errors: u32) {
        if status == JobStatus::Error || ack_errors > 0 {
            tracing::warn!(job_id, %status, ack_errors, "Job status");
        } else {
            tracing::info!(job_id, %status, "Job status");
        }
    }

    fn update_progress(&mut self, job_id: &str, progress: &JobProgress) {
        match progress.percentage {
            Some(percent) => {
                tracing::info!(job_id, percent, label = %progress.label, "Job progress");
            }
            None => tracing::info!(job_id, label = %progress.label, "Job progress"),
        }
    }

    fn show_error(&mut self, message: &str) {
        self.banner_visible = true;
        tracing::error!(error = message, "Jobs error");
    }

    fn hide_error(&mut self) {
        if std::mem::take(&mut self.banner_visible) {
            tracing::info!("Jobs error cleared");
        }
    }
}
