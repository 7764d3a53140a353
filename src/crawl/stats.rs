// src/crawl/stats.rs
// =============================================================================
// What a crawl hands back when it is over.
//
// Each worker fills its own WorkerReport (no sharing between workers); the
// coordinator merges them into one CrawlReport at the end. Pages fetched
// before a cancellation are still part of the report.
// =============================================================================

use super::frontier::StopReason;
use crate::error::CrawlError;
use crate::page::Page;
use serde::Serialize;

/// One page that could not be fetched or parsed
#[derive(Debug, Clone, Serialize)]
pub struct PageFailure {
    pub url: String,
    /// "fetch", "parse" or "url"
    pub kind: &'static str,
    pub message: String,
}

impl PageFailure {
    pub fn new(url: &str, error: &CrawlError) -> Self {
        Self {
            url: url.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Results collected by a single worker
#[derive(Debug, Default)]
pub struct WorkerReport {
    pub pages: Vec<Page>,
    pub failures: Vec<PageFailure>,
    /// Links found on this worker's pages
    pub links_discovered: usize,
    /// Of those, links that were new to the frontier
    pub links_enqueued: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub links_discovered: usize,
    pub links_enqueued: usize,
    pub skipped_links: usize,
    /// Queued URLs dropped because the crawl was stopped early
    pub discarded: usize,
    pub errors: usize,
    pub stop_reason: StopReason,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub stats: CrawlStats,
    pub failures: Vec<PageFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<Page>,
}

impl CrawlReport {
    pub(crate) fn new(stop_reason: StopReason) -> Self {
        Self {
            stats: CrawlStats {
                pages_fetched: 0,
                links_discovered: 0,
                links_enqueued: 0,
                skipped_links: 0,
                discarded: 0,
                errors: 0,
                stop_reason,
                elapsed_ms: 0,
            },
            failures: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub(crate) fn absorb(&mut self, worker: WorkerReport) {
        self.stats.pages_fetched += worker.pages.len();
        self.stats.errors += worker.failures.len();
        self.stats.links_discovered += worker.links_discovered;
        self.stats.links_enqueued += worker.links_enqueued;
        self.pages.extend(worker.pages);
        self.failures.extend(worker.failures);
    }

    /// True when the crawl ran to completion without a single failed page
    pub fn is_clean(&self) -> bool {
        self.stats.errors == 0 && self.stats.stop_reason == StopReason::Exhausted
    }
}
