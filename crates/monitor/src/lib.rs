//! Polling job-status monitor.
//!
//! [`JobsMonitor`](monitor::JobsMonitor) fetches the status of every
//! unfinished job in its container from a jobs endpoint, pushes the
//! updates to a [`JobsView`](view::JobsView), and reports once every job
//! has reached a terminal state. [`task`] drives it on a timer.

pub mod config;
pub mod events;
pub mod monitor;
pub mod task;
pub mod transport;
pub mod view;

pub use monitor::{CycleOutcome, JobsMonitor, MonitorState};
pub use task::MonitorHandle;
pub use transport::{HttpTransport, JobsTransport, TransportError};
pub use view::{JobsView, LogView, NullView};
