//! Domain types for the jobwatch job-status monitor.
//!
//! Everything here is pure data and parsing: job records as returned by
//! the jobs endpoint, the ordered [`JobSet`](job_set::JobSet) the monitor
//! owns, and the error banner. No I/O lives in this crate.

pub mod banner;
pub mod container;
pub mod error;
pub mod job;
pub mod job_set;
pub mod payload;
pub mod types;
