// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command: give it a seed URL and it crawls everything
// reachable from there, then prints a summary.
//
//   frontier-crawler https://example.com --workers 8 --max-pages 500
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Derive macros: Automatically generate code for our types
// - Option<T>: flags the user may leave out
// =============================================================================

use frontier_crawler::config::{CrawlConfig, DEFAULT_USER_AGENT, DEFAULT_WORKERS};
use clap::{ArgAction, Parser};
use std::time::Duration;

// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "frontier-crawler",
    version,
    about = "Crawl a website with a pool of concurrent workers",
    long_about = "frontier-crawler starts from a seed URL, follows every link it finds, \
                  and fetches each discovered page exactly once. Press Ctrl-C to stop early; \
                  pages already fetched are still reported."
)]
pub struct Cli {
    /// URL the crawl starts from (e.g., https://example.com)
    pub seed: String,

    /// Number of pages fetched concurrently
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Stop after this many pages have been handed to workers (failed fetches count too)
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Stop after this many seconds, finishing pages already in flight
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Include every fetched page (title, text, links) in the JSON output
    #[arg(long, requires = "json")]
    pub include_pages: bool,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn build_config(&self) -> CrawlConfig {
        CrawlConfig {
            workers: self.workers,
            max_pages: self.max_pages,
            deadline: self.deadline_secs.map(Duration::from_secs),
            request_timeout: Duration::from_secs(self.timeout_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}
