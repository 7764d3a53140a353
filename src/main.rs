// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so stdout stays clean for --json)
// 3. Build the fetcher, parser and coordinator, then run the crawl
// 4. Print the crawl summary
// 5. Exit with proper code (0 = clean crawl, 1 = some pages failed, 2 = error)
//
// Ctrl-C does not kill the process outright: it cancels the crawl, lets the
// pages already being fetched finish, and still prints the summary.
// =============================================================================

mod cli;

use clap::Parser;
use cli::Cli;
use frontier_crawler::{Coordinator, CrawlReport, HtmlParser, HttpFetcher};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = crawl finished and every page was fetched
//   Ok(1) = crawl finished but some pages failed
//   Err   = bad seed URL or bad configuration
async fn run() -> Result<i32> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.build_config();
    let fetcher = HttpFetcher::new(&config)?;
    let parser = HtmlParser::new()?;
    let coordinator = Coordinator::new(fetcher, parser, config)?;

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let mut report = coordinator.run_crawl_until(&cli.seed, cancel).await?;

    if !cli.include_pages {
        report.pages.clear();
    }
    print_results(&report, cli.json)?;

    if report.stats.errors > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// RUST_LOG wins when set; otherwise -v flags pick the level for our crate
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "frontier_crawler=info",
        1 => "frontier_crawler=debug",
        _ => "frontier_crawler=trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("interrupted, finishing pages in flight");
        cancel.cancel();
    }
}

fn print_results(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

fn print_table(report: &CrawlReport) {
    let stats = &report.stats;

    if !report.failures.is_empty() {
        println!("{:<60} {:<8} {:<30}", "URL", "KIND", "MESSAGE");
        println!("{}", "=".repeat(98));

        for failure in &report.failures {
            println!(
                "{:<60} {:<8} {:<30}",
                truncate(&failure.url, 57),
                failure.kind,
                failure.message
            );
        }
        println!();
    }

    println!("📊 Summary:");
    println!("   📄 Pages fetched:    {}", stats.pages_fetched);
    println!("   🔗 Links discovered: {}", stats.links_discovered);
    println!("   ➕ Links enqueued:   {}", stats.links_enqueued);
    println!("   ⏭️  Links skipped:    {}", stats.skipped_links);
    println!("   ❌ Errors:           {}", stats.errors);
    if stats.discarded > 0 {
        println!("   🗑️  Left unvisited:   {}", stats.discarded);
    }
    println!("   🏁 Stopped:          {:?}", stats.stop_reason);
    println!("   ⏱️  Elapsed:          {} ms", stats.elapsed_ms);
}

// Cuts on a char boundary so multi-byte URLs never panic
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let cut: String = s.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        s.to_string()
    }
}
