//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use jobwatch_core::types::JobId;
use jobwatch_monitor::{JobsMonitor, JobsTransport, TransportError};

pub enum Canned {
    Body(String),
    Status(u16, String),
}

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Canned>>,
    calls: Mutex<Vec<(String, Vec<JobId>)>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_body(&self, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Canned::Body(body.to_string()));
    }

    pub fn reply_status(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Canned::Status(status, body.to_string()));
    }

    pub fn calls(&self) -> Vec<(String, Vec<JobId>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobsTransport for MockTransport {
    async fn fetch_statuses(&self, url: &str, ids: &[JobId]) -> Result<String, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), ids.to_vec()));

        match self.responses.lock().unwrap().pop_front() {
            Some(Canned::Body(body)) => Ok(body),
            Some(Canned::Status(status, body)) => Err(TransportError::HttpStatus { status, body }),
            None => Err(TransportError::HttpStatus {
                status: 404,
                body: "no canned response".to_string(),
            }),
        }
    }
}

/// Records every invocation of the finished callback.
#[derive(Clone, Default)]
pub struct FinishedListener {
    calls: Arc<Mutex<Vec<Vec<JobId>>>>,
}

impl FinishedListener {
    pub fn attach(&self, monitor: &mut JobsMonitor) {
        let calls = Arc::clone(&self.calls);
        monitor.on_all_jobs_finished(move |remaining| {
            calls.lock().unwrap().push(remaining.to_vec());
        });
    }

    pub fn calls(&self) -> Vec<Vec<JobId>> {
        self.calls.lock().unwrap().clone()
    }
}

/// A transport whose requests never complete. Counts the requests sent.
#[derive(Default)]
pub struct HangingTransport {
    calls: AtomicUsize,
}

impl HangingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobsTransport for HangingTransport {
    async fn fetch_statuses(&self, _url: &str, _ids: &[JobId]) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}
