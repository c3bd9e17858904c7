//! Environment configuration for the `jobwatch` daemon.
//!
//! | Variable                    | Required | Default | Description                              |
//! |-----------------------------|----------|---------|------------------------------------------|
//! | `JOBS_URL`                  | yes      | --      | Jobs endpoint, e.g. `http://crm/jobs/info` |
//! | `JOB_IDS`                   | yes      | --      | Comma-separated ids of the jobs to track |
//! | `JOBS_FETCH_DELAY_MS`       | no       | `5000`  | Milliseconds between polling cycles      |
//! | `JOBS_REQUEST_TIMEOUT_SECS` | no       | `10`    | Per-request HTTP timeout                 |

use std::time::Duration;

use jobwatch_core::types::JobId;

use crate::monitor::DEFAULT_FETCH_DELAY_MS;
use crate::transport::DEFAULT_REQUEST_TIMEOUT;

pub const ENV_JOBS_URL: &str = "JOBS_URL";
pub const ENV_JOB_IDS: &str = "JOB_IDS";
pub const ENV_FETCH_DELAY_MS: &str = "JOBS_FETCH_DELAY_MS";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "JOBS_REQUEST_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Settings for one monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub url: String,
    pub job_ids: Vec<JobId>,
    pub fetch_delay_ms: u64,
    pub request_timeout: Duration,
}

impl MonitorConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_JOBS_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(ENV_JOBS_URL))?;

        let raw_ids = lookup(ENV_JOB_IDS).ok_or(ConfigError::Missing(ENV_JOB_IDS))?;
        let job_ids = parse_job_ids(&raw_ids);
        if job_ids.is_empty() {
            return Err(ConfigError::Invalid {
                name: ENV_JOB_IDS,
                expected: "a comma-separated list of job ids",
                value: raw_ids,
            });
        }

        let fetch_delay_ms =
            parse_optional(&lookup, ENV_FETCH_DELAY_MS, "an integer")?.unwrap_or(DEFAULT_FETCH_DELAY_MS);

        let request_timeout = match parse_optional(&lookup, ENV_REQUEST_TIMEOUT_SECS, "a positive integer")? {
            Some(0) => {
                return Err(ConfigError::Invalid {
                    name: ENV_REQUEST_TIMEOUT_SECS,
                    expected: "a positive integer",
                    value: "0".into(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            url,
            job_ids,
            fetch_delay_ms,
            request_timeout,
        })
    }
}

/// Split a comma-separated id list, dropping blanks.
pub fn parse_job_ids(raw: &str) -> Vec<JobId> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_optional<F>(
    lookup: &F,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
