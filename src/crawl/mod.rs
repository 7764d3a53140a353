// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// - frontier:    the shared, deduplicating queue of URLs to visit
// - link:        URL normalization used by the frontier
// - worker:      one member of the worker pool
// - coordinator: starts the pool and decides when the crawl is over
// - stats:       the report a finished crawl hands back
// =============================================================================

mod coordinator;
mod frontier;
mod link;
mod stats;
mod worker;

pub use coordinator::Coordinator;
pub use frontier::{Claim, Frontier, StopReason};
pub use stats::{CrawlReport, CrawlStats, PageFailure};
pub use worker::WorkerState;
