//! `jobwatch` -- follows CRM background jobs until they finish.
//!
//! Polls the jobs endpoint for a fixed list of ids, logs every status
//! and progress change, and exits once every job is terminal. See
//! [`jobwatch_monitor::config`] for the environment variables.
//!
//! Exit codes: `0` all jobs finished, `1` configuration or transport
//! error, `2` the endpoint reported an application error, `130`
//! interrupted.

use std::process::ExitCode;
use std::sync::Arc;

use jobwatch_core::container::JobsContainer;
use jobwatch_core::job_set::JobSet;
use jobwatch_monitor::config::MonitorConfig;
use jobwatch_monitor::{CycleOutcome, HttpTransport, JobsMonitor, LogView};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobwatch_monitor=info,jobwatch=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let transport = match HttpTransport::new(config.request_timeout) {
        Ok(transport) => transport,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        url = %config.url,
        jobs = config.job_ids.len(),
        fetch_delay_ms = config.fetch_delay_ms,
        "Starting jobwatch",
    );

    let container = JobsContainer::new(JobSet::from_ids(config.job_ids));
    let mut monitor =
        JobsMonitor::new(config.url, container, Arc::new(transport)).with_view(LogView::default());
    monitor.set_fetch_delay(config.fetch_delay_ms);
    monitor.on_all_jobs_finished(|remaining| {
        tracing::info!(remaining = remaining.len(), "Nothing left to track");
    });

    let handle = monitor.spawn();
    let cancel = handle.cancel_token();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            cancel.cancel();
        }
    });

    let outcome = match handle.join().await {
        Ok((_, outcome)) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "Monitor task failed");
            return ExitCode::FAILURE;
        }
    };

    match outcome {
        Some(CycleOutcome::AllFinished | CycleOutcome::Skipped) => ExitCode::SUCCESS,
        Some(CycleOutcome::ApplicationError { .. }) => ExitCode::from(2),
        Some(CycleOutcome::TransportFailed { .. }) => ExitCode::FAILURE,
        Some(CycleOutcome::Pending { remaining }) => {
            // Only reachable with a zero fetch delay: one cycle, no timer.
            tracing::info!(remaining = remaining.len(), "Single cycle done, jobs still pending");
            ExitCode::SUCCESS
        }
        None => ExitCode::from(130),
    }
}
