// src/config.rs
// =============================================================================
// Run-time settings for one crawl.
//
// The CLI builds a CrawlConfig from its flags; tests build one directly.
// validate() is called once by the coordinator before any worker starts.
// =============================================================================

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = concat!("frontier-crawler/", env!("CARGO_PKG_VERSION"));

/// Errors for settings that can never produce a working crawl
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be greater than 0")]
    NoWorkers,

    #[error("max pages must be greater than 0 when set")]
    ZeroPageLimit,

    #[error("request timeout must be greater than 0")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Size of the worker pool
    pub workers: usize,
    /// Stop after this many URLs have been claimed by workers
    pub max_pages: Option<usize>,
    /// Stop claiming new work once this much wall-clock time has passed
    pub deadline: Option<Duration>,
    /// Per-request timeout handed to the HTTP client
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_pages: None,
            deadline: None,
            request_timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl CrawlConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.max_pages == Some(0) {
            return Err(ConfigError::ZeroPageLimit);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}
