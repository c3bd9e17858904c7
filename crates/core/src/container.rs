//! The element a monitor is bound to: the job list plus its banner.

use serde::Serialize;

use crate::banner::Banner;
use crate::job_set::JobSet;

#[derive(Debug, Clone, Default, Serialize)]
pub struct JobsContainer {
    pub jobs: JobSet,
    pub banner: Banner,
}

impl JobsContainer {
    pub fn new(jobs: JobSet) -> Self {
        Self {
            jobs,
            banner: Banner::default(),
        }
    }
}
