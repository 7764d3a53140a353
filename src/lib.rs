// src/lib.rs
// =============================================================================
// Library side of frontier-crawler. src/main.rs and src/cli.rs are a thin CLI on top of it.
//
// Modules:
// - crawl:  the frontier, the worker pool and the coordinator
// - page:   Fetch/Parse traits and their reqwest/scraper implementations
// - config: CrawlConfig and its validation
// - error:  error types shared by everything above
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod page;

pub use config::CrawlConfig;
pub use crawl::{Coordinator, CrawlReport, CrawlStats, Frontier, StopReason};
pub use page::{Document, Fetch, HtmlParser, HttpFetcher, Page, Parse};
