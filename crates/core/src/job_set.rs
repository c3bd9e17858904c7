//! The ordered collection of tracked jobs.
//!
//! [`JobSet`] is the single source of truth for which jobs are still
//! pending. The pending subset is always derived from the current job
//! statuses at the moment it is asked for; it is never cached.

use serde::Serialize;

use crate::job::{Job, JobRecord};
use crate::types::{JobId, Timestamp};

#[derive(Debug, Clone, Default, Serialize)]
pub struct JobSet {
    jobs: Vec<Job>,
}

/// Result of applying one polled record to the set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyResult {
    /// The job exists and at least one visible field changed.
    Updated,
    /// The job exists but the record matched its current state.
    Unchanged,
    /// No tracked job has this id.
    UnknownJob,
}

impl JobSet {
    /// Build a set from jobs in display order. Later duplicates of an id
    /// are dropped.
    pub fn new(jobs: impl IntoIterator<Item = Job>) -> Self {
        let mut set = Self::default();
        for job in jobs {
            if set.get(&job.id).is_some() {
                tracing::debug!(job_id = %job.id, "Ignoring duplicate job entry");
                continue;
            }
            set.jobs.push(job);
        }
        set
    }

    /// Build a set of freshly rendered jobs from their ids.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<JobId>,
    {
        Self::new(ids.into_iter().map(Job::new))
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    /// Ids of every non-terminal job, in display order.
    pub fn pending_ids(&self) -> Vec<JobId> {
        self.jobs
            .iter()
            .filter(|job| job.is_pending())
            .map(|job| job.id.clone())
            .collect()
    }

    pub fn all_finished(&self) -> bool {
        self.jobs.iter().all(|job| !job.is_pending())
    }

    /// Apply a polled record to the job with the same id.
    pub fn apply(&mut self, record: &JobRecord, at: Timestamp) -> ApplyResult {
        match self.jobs.iter_mut().find(|job| job.id == record.id) {
            Some(job) => {
                if job.apply(record, at) {
                    ApplyResult::Updated
                } else {
                    ApplyResult::Unchanged
                }
            }
            None => ApplyResult::UnknownJob,
        }
    }
}

impl<'a> IntoIterator for &'a JobSet {
    type Item = &'a Job;
    type IntoIter = std::slice::Iter<'a, Job>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
