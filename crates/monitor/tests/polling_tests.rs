//! Integration tests for timer-driven polling ([`JobsMonitor::run`] and
//! [`JobsMonitor::spawn`]).
//!
//! Tokio's clock is paused, so the 5 s default delay elapses instantly
//! and deterministically.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FinishedListener, HangingTransport, MockTransport};
use jobwatch_core::container::JobsContainer;
use jobwatch_core::job_set::JobSet;
use jobwatch_core::types::JobId;
use jobwatch_monitor::events::MonitorEvent;
use jobwatch_monitor::{CycleOutcome, JobsMonitor, MonitorState};
use tokio_util::sync::CancellationToken;

const STILL_RUNNING: &str = r#"[{"id":"job-a","status":"running"}]"#;
const DONE: &str = r#"[{"id":"job-a","status":"ok"}]"#;

fn monitor(transport: &Arc<MockTransport>) -> JobsMonitor {
    let container = JobsContainer::new(JobSet::from_ids(["job-a"]));
    JobsMonitor::new("mock/jobs", container, transport.clone())
}

// ---------------------------------------------------------------------------
// Test: run
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn run_polls_until_all_jobs_finish() {
    let transport = MockTransport::new();
    transport.reply_body(STILL_RUNNING);
    transport.reply_body(STILL_RUNNING);
    transport.reply_body(DONE);

    let listener = FinishedListener::default();
    let mut m = monitor(&transport);
    listener.attach(&mut m);

    let started = tokio::time::Instant::now();
    let outcome = m.run(&CancellationToken::new()).await;

    assert_eq!(outcome, Some(CycleOutcome::AllFinished));
    assert_eq!(transport.calls().len(), 3);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(10), "two delays expected, got {elapsed:?}");
    assert!(elapsed < Duration::from_secs(11), "no third delay expected, got {elapsed:?}");
    assert_eq!(listener.calls(), vec![Vec::<JobId>::new()]);
}

#[tokio::test(start_paused = true)]
async fn run_stops_after_transport_error() {
    let transport = MockTransport::new();
    transport.reply_body(STILL_RUNNING);
    transport.reply_status(502, "bad gateway");
    transport.reply_body(DONE);

    let mut m = monitor(&transport);
    let outcome = m.run(&CancellationToken::new()).await;

    assert_eq!(outcome, Some(CycleOutcome::TransportFailed { status: Some(502) }));
    assert_eq!(transport.calls().len(), 2);
    assert_eq!(m.state(), MonitorState::Errored);
    assert_eq!(m.element().banner.text(), "HTTP server error");
}

#[tokio::test(start_paused = true)]
async fn run_with_zero_delay_does_a_single_cycle() {
    let transport = MockTransport::new();
    transport.reply_body(STILL_RUNNING);
    transport.reply_body(DONE);

    let mut m = monitor(&transport);
    m.set_fetch_delay(0);

    let outcome = m.run(&CancellationToken::new()).await;

    assert_eq!(
        outcome,
        Some(CycleOutcome::Pending {
            remaining: vec!["job-a".to_string()]
        })
    );
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn run_with_cancelled_token_sends_nothing() {
    let transport = MockTransport::new();
    transport.reply_body(DONE);

    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut m = monitor(&transport);
    assert_eq!(m.run(&cancel).await, None);
    assert!(transport.calls().is_empty());
    assert_eq!(m.state(), MonitorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_request_returns_to_idle() {
    let transport = HangingTransport::new();
    let container = JobsContainer::new(JobSet::from_ids(["job-a"]));
    let mut m = JobsMonitor::new("mock/jobs", container, transport.clone());
    let mut events = m.subscribe();

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        canceller.cancel();
    });

    assert_eq!(m.run(&cancel).await, None);
    assert_eq!(transport.calls(), 1);
    assert_eq!(m.state(), MonitorState::Idle);
    assert!(!m.element().banner.is_visible());

    // The cycle did start before it was abandoned.
    match events.try_recv().unwrap() {
        MonitorEvent::CycleStarted { job_ids, .. } => assert_eq!(job_ids, vec!["job-a".to_string()]),
        other => panic!("Expected CycleStarted, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn stop_during_request_hands_back_an_idle_monitor() {
    let transport = HangingTransport::new();
    let container = JobsContainer::new(JobSet::from_ids(["job-a"]));
    let handle = JobsMonitor::new("mock/jobs", container, transport.clone()).spawn();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    let (m, outcome) = handle.stop().await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(transport.calls(), 1);
    assert_eq!(m.state(), MonitorState::Idle);
}

// ---------------------------------------------------------------------------
// Test: spawn / MonitorHandle
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn spawned_monitor_hands_itself_back() {
    let transport = MockTransport::new();
    transport.reply_body(STILL_RUNNING);
    transport.reply_body(DONE);

    let handle = monitor(&transport).spawn();
    let (m, outcome) = handle.join().await.unwrap();

    assert_eq!(outcome, Some(CycleOutcome::AllFinished));
    assert_eq!(m.state(), MonitorState::AllFinished);
    assert!(m.element().jobs.all_finished());
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_pending_timer() {
    let transport = MockTransport::new();
    for _ in 0..10 {
        transport.reply_body(STILL_RUNNING);
    }

    let handle = monitor(&transport).spawn();

    // Cycles at 0 s, 5 s and 10 s; the next one would be at 15 s.
    tokio::time::sleep(Duration::from_millis(12_000)).await;
    let (m, outcome) = handle.stop().await.unwrap();

    assert_eq!(outcome, None);
    assert_eq!(transport.calls().len(), 3);
    assert_eq!(m.state(), MonitorState::Idle);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels_polling() {
    let transport = MockTransport::new();
    for _ in 0..10 {
        transport.reply_body(STILL_RUNNING);
    }

    let handle = monitor(&transport).spawn();
    let cancel = handle.cancel_token();

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    drop(handle);
    assert!(cancel.is_cancelled());

    tokio::time::sleep(Duration::from_millis(30_000)).await;
    assert_eq!(transport.calls().len(), 1);
}
