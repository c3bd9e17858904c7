//! Job status records and the per-job view-model.
//!
//! [`JobRecord`] is the wire shape returned by the jobs endpoint,
//! [`Job`] is what the monitor keeps for each tracked job between
//! polling cycles.

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Numeric status codes used by the CRM's job model.
pub const STATUS_CODE_WAIT: i64 = 1;
pub const STATUS_CODE_ERROR: i64 = 10;
pub const STATUS_CODE_OK: i64 = 20;

/// Lifecycle status of a background job.
///
/// The endpoint may send either the lowercase name or the numeric code
/// of the CRM job model. Anything unrecognised (including the empty
/// string rendered before the first poll) becomes [`JobStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "RawStatus")]
pub enum JobStatus {
    /// Queued, not started yet.
    Wait,
    /// Currently executing.
    Running,
    /// Finished successfully.
    Ok,
    /// Finished with an error.
    Error,
    #[default]
    Unknown,
}

impl JobStatus {
    /// `Ok` and `Error` are terminal; a terminal job is never polled again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Ok | JobStatus::Error)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Wait => "wait",
            JobStatus::Running => "running",
            JobStatus::Ok => "ok",
            JobStatus::Error => "error",
            JobStatus::Unknown => "unknown",
        }
    }

    /// Parse a status name. Aliases cover the names used by older
    /// templates (`pending`, `finished`); a numeric string is read as a
    /// status code.
    pub fn from_name(name: &str) -> Self {
        let name = name.trim();
        if let Ok(code) = name.parse::<i64>() {
            return JobStatus::from_code(code);
        }
        match name.to_ascii_lowercase().as_str() {
            "wait" | "pending" => JobStatus::Wait,
            "running" => JobStatus::Running,
            "ok" | "finished" => JobStatus::Ok,
            "error" => JobStatus::Error,
            _ => JobStatus::Unknown,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            STATUS_CODE_WAIT => JobStatus::Wait,
            STATUS_CODE_ERROR => JobStatus::Error,
            STATUS_CODE_OK => JobStatus::Ok,
            _ => JobStatus::Unknown,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(i64),
    Float(f64),
    Name(String),
    Missing(()),
}

impl From<RawStatus> for JobStatus {
    fn from(raw: RawStatus) -> Self {
        match raw {
            RawStatus::Code(code) => JobStatus::from_code(code),
            RawStatus::Float(code) if code.fract() == 0.0 => JobStatus::from_code(code as i64),
            RawStatus::Float(_) => JobStatus::Unknown,
            RawStatus::Name(name) => JobStatus::from_name(&name),
            RawStatus::Missing(()) => JobStatus::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress of a job as displayed next to its progress bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProgress {
    /// Completion percentage (0-100). `None` for jobs that only report
    /// a label (e.g. "3 entities imported").
    #[serde(default, deserialize_with = "deserialize_percentage")]
    pub percentage: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub label: String,
}

impl JobProgress {
    pub fn new(percentage: Option<u8>, label: impl Into<String>) -> Self {
        Self {
            percentage: percentage.map(|p| p.min(100)),
            label: label.into(),
        }
    }
}

/// Accepts numbers, numeric strings and `null`; clamps into `0..=100`.
/// Anything else reads as no percentage.
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPercentage {
        Number(f64),
        Text(String),
        Missing(()),
    }

    let value = match RawPercentage::deserialize(deserializer)? {
        RawPercentage::Number(n) => Some(n),
        RawPercentage::Text(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        RawPercentage::Missing(()) => None,
    };
    Ok(value
        .filter(|v: &f64| v.is_finite())
        .map(|v| v.round().clamp(0.0, 100.0) as u8))
}

fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unacknowledged error counts are sent as a number, but templates render
/// an empty string when there are none.
fn deserialize_ack_errors<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Number(u32),
        Text(String),
        Missing(()),
    }

    Ok(match RawCount::deserialize(deserializer)? {
        RawCount::Number(n) => n,
        RawCount::Text(s) => s.trim().parse().unwrap_or(0),
        RawCount::Missing(()) => 0,
    })
}

// ---------------------------------------------------------------------------
// Wire record
// ---------------------------------------------------------------------------

/// One element of the array returned by the jobs endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default, deserialize_with = "deserialize_ack_errors")]
    pub ack_errors: u32,
    #[serde(default)]
    pub progress: JobProgress,
}

// ---------------------------------------------------------------------------
// View-model
// ---------------------------------------------------------------------------

/// A tracked job as held by the monitor's container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    pub ack_errors: u32,
    pub progress: JobProgress,
    /// When the last record for this job was applied. `None` until the
    /// first successful poll that mentions it.
    pub updated_at: Option<Timestamp>,
}

impl Job {
    /// A job in its initial rendered state: unknown status, no progress.
    pub fn new(id: impl Into<JobId>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Unknown,
            ack_errors: 0,
            progress: JobProgress::default(),
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_progress(mut self, percentage: Option<u8>, label: impl Into<String>) -> Self {
        self.progress = JobProgress::new(percentage, label);
        self
    }

    pub fn is_pending(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Copy the fields of `record` into this job.
    ///
    /// Returns `true` when anything visible changed.
    pub fn apply(&mut self, record: &JobRecord, at: Timestamp) -> bool {
        let changed = self.status != record.status
            || self.ack_errors != record.ack_errors
            || self.progress != record.progress;

        self.status = record.status;
        self.ack_errors = record.ack_errors;
        self.progress = record.progress.clone();
        self.updated_at = Some(at);
        changed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
