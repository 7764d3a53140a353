// src/crawl/coordinator.rs
// =============================================================================
// Runs one crawl: seeds a frontier, starts a fixed pool of workers against
// it, and waits until every worker has stopped.
//
// The crawl ends in one of four ways (see StopReason):
// - Exhausted: the frontier is empty and no worker is busy
// - Cancelled: the caller's CancellationToken fired
// - PageLimit: config.max_pages URLs have been handed out
// - Deadline:  config.deadline elapsed
//
// In every case pages already fetched are kept and returned.
// =============================================================================

use super::frontier::{Frontier, StopReason};
use super::link;
use super::stats::{CrawlReport, WorkerReport};
use super::worker::Worker;
use crate::config::{ConfigError, CrawlConfig};
use crate::error::CrawlError;
use crate::page::{Fetch, Parse};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Coordinator<F, P> {
    fetcher: Arc<F>,
    parser: Arc<P>,
    config: CrawlConfig,
}

impl<F: Fetch, P: Parse> Coordinator<F, P> {
    pub fn new(fetcher: F, parser: P, config: CrawlConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            parser: Arc::new(parser),
            config,
        })
    }

    /// An empty frontier honouring this coordinator's page limit
    pub fn new_frontier(&self) -> Frontier {
        match self.config.max_pages {
            Some(limit) => Frontier::with_page_limit(limit),
            None => Frontier::new(),
        }
    }

    /// Crawls from `seed` until the crawl finishes on its own.
    pub async fn run_crawl(&self, seed: &str) -> Result<CrawlReport, CrawlError> {
        self.run_crawl_until(seed, CancellationToken::new()).await
    }

    /// Like run_crawl, but stops early when `cancel` fires.
    ///
    /// A seed that is not an absolute http(s) URL is the only error this
    /// returns; every per-page failure ends up in the report instead.
    pub async fn run_crawl_until(
        &self,
        seed: &str,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let seed = link::normalize(seed)?;

        let frontier = Arc::new(self.new_frontier());
        frontier.enqueue(seed.as_str());
        tracing::info!(seed = %seed, workers = self.config.workers, "starting crawl");

        Ok(self.run(frontier, cancel).await)
    }

    /// Drives the worker pool against an already seeded frontier.
    pub async fn run(&self, frontier: Arc<Frontier>, cancel: CancellationToken) -> CrawlReport {
        let started = Instant::now();

        let watcher = tokio::spawn(watch_for_stop(
            Arc::clone(&frontier),
            cancel,
            self.config.deadline,
        ));

        let handles: Vec<JoinHandle<WorkerReport>> = (0..self.config.workers)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&frontier),
                    Arc::clone(&self.fetcher),
                    Arc::clone(&self.parser),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        let results = join_all(handles).await;
        watcher.abort();

        // Every worker has seen dequeue() return None, so the frontier has
        // recorded why it stopped.
        let stop_reason = frontier.stop_reason().unwrap_or(StopReason::Exhausted);
        let mut report = CrawlReport::new(stop_reason);

        for (id, result) in results.into_iter().enumerate() {
            match result {
                Ok(worker_report) => report.absorb(worker_report),
                Err(e) => tracing::error!(worker = id, error = %e, "worker task failed"),
            }
        }

        report.stats.skipped_links = frontier.skipped();
        report.stats.discarded = frontier.discarded();
        report.stats.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        tracing::info!(
            pages = report.stats.pages_fetched,
            errors = report.stats.errors,
            reason = ?report.stats.stop_reason,
            elapsed_ms = report.stats.elapsed_ms,
            "crawl finished"
        );
        report
    }
}

// Turns the cancellation token (and the optional deadline) into a frontier
// close. Aborted by run() once the workers are done.
async fn watch_for_stop(
    frontier: Arc<Frontier>,
    cancel: CancellationToken,
    deadline: Option<Duration>,
) {
    let reason = match deadline {
        Some(deadline) => tokio::select! {
            _ = cancel.cancelled() => StopReason::Cancelled,
            _ = tokio::time::sleep(deadline) => StopReason::Deadline,
        },
        None => {
            cancel.cancelled().await;
            StopReason::Cancelled
        }
    };

    if frontier.close(reason) {
        tracing::info!(
            ?reason,
            in_flight = frontier.active(),
            discarded = frontier.discarded(),
            "stopping crawl"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, ParseError};
    use crate::page::{Document, Page};
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use tokio::sync::{mpsc, Semaphore};
    use url::Url;

    const ORIGIN: &str = "https://example.test";

    fn at(path: &str) -> String {
        format!("{}{}", ORIGIN, path)
    }

    // An in-memory website. Bodies are "# title" followed by one link per
    // line; LineParser below reads that format back.
    struct StubSite {
        bodies: HashMap<String, Result<String, u16>>,
        delays: HashMap<String, Duration>,
        gated: HashSet<String>,
        gate: Arc<Semaphore>,
        started: Option<mpsc::UnboundedSender<String>>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl StubSite {
        fn new() -> Self {
            Self {
                bodies: HashMap::new(),
                delays: HashMap::new(),
                gated: HashSet::new(),
                gate: Arc::new(Semaphore::new(0)),
                started: None,
                log: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn page(mut self, path: &str, links: &[&str]) -> Self {
            let mut body = format!("# {}\n", path);
            body.push_str(&links.join("\n"));
            self.bodies.insert(at(path), Ok(body));
            self
        }

        fn raw(mut self, path: &str, body: &str) -> Self {
            self.bodies.insert(at(path), Ok(body.to_string()));
            self
        }

        fn failing(mut self, path: &str, status: u16) -> Self {
            self.bodies.insert(at(path), Err(status));
            self
        }

        fn slow(mut self, path: &str, millis: u64) -> Self {
            self.delays.insert(at(path), Duration::from_millis(millis));
            self
        }

        // Fetches of `path` report on `started`, then block until the test
        // adds permits to `gate`.
        fn gated(mut self, path: &str, started: mpsc::UnboundedSender<String>) -> Self {
            self.gated.insert(at(path));
            self.started = Some(started);
            self
        }

        fn log(&self) -> Arc<Mutex<Vec<String>>> {
            Arc::clone(&self.log)
        }
    }

    #[async_trait]
    impl Fetch for StubSite {
        async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
            let key = url.to_string();
            self.log.lock().unwrap().push(key.clone());

            if let Some(delay) = self.delays.get(&key) {
                tokio::time::sleep(*delay).await;
            }
            if self.gated.contains(&key) {
                if let Some(started) = &self.started {
                    started.send(key.clone()).unwrap();
                }
                self.gate.acquire().await.unwrap().forget();
            }

            match self.bodies.get(&key) {
                Some(Ok(body)) => Ok(Document {
                    status: 200,
                    headers: HashMap::new(),
                    body: body.clone(),
                }),
                Some(Err(status)) => Err(FetchError::Status(*status)),
                None => Err(FetchError::Status(404)),
            }
        }
    }

    struct LineParser;

    impl Parse for LineParser {
        fn parse(&self, url: &Url, body: &str) -> Result<Page, ParseError> {
            if body.trim().is_empty() {
                return Err(ParseError::Empty);
            }
            let mut title = None;
            let mut links = Vec::new();
            for line in body.lines().filter(|l| !l.is_empty()) {
                match line.strip_prefix("# ") {
                    Some(t) => title = Some(t.to_string()),
                    None => links.push(line.to_string()),
                }
            }
            Ok(Page {
                url: url.to_string(),
                title,
                body: body.to_string(),
                links,
            })
        }
    }

    fn coordinator(site: StubSite, config: CrawlConfig) -> Coordinator<StubSite, LineParser> {
        Coordinator::new(site, LineParser, config).unwrap()
    }

    fn fetch_count(log: &Arc<Mutex<Vec<String>>>, path: &str) -> usize {
        let url = at(path);
        log.lock().unwrap().iter().filter(|u| **u == url).count()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_crawls_seed_and_links() {
        let site = StubSite::new()
            .page("/a", &["/b", "/c"])
            .page("/b", &[])
            .page("/c", &[]);
        let crawler = coordinator(site, CrawlConfig::default().with_workers(2));

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 3);
        assert_eq!(report.stats.errors, 0);
        assert_eq!(report.stats.links_enqueued, 2);
        assert_eq!(report.stats.stop_reason, StopReason::Exhausted);
        assert!(report.is_clean());

        let mut urls: Vec<_> = report.pages.iter().map(|p| p.url.as_str()).collect();
        urls.sort();
        assert_eq!(urls, vec![at("/a"), at("/b"), at("/c")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fetch_error_does_not_stop_crawl() {
        let site = StubSite::new()
            .page("/a", &["/b", "/c"])
            .page("/b", &[])
            .failing("/c", 503);
        let crawler = coordinator(site, CrawlConfig::default().with_workers(2));

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 2);
        assert_eq!(report.stats.errors, 1);
        assert_eq!(report.failures[0].url, at("/c"));
        assert_eq!(report.failures[0].message, "fetch failed: HTTP 503");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parse_error_is_recorded() {
        let site = StubSite::new().page("/a", &["/empty"]).raw("/empty", "");
        let crawler = coordinator(site, CrawlConfig::default().with_workers(2));

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 1);
        assert_eq!(report.stats.errors, 1);
        assert_eq!(report.failures[0].kind, "parse");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_link_fetched_once() {
        let site = StubSite::new()
            .page("/a", &["/b", "/c"])
            .page("/b", &["/d"])
            .page("/c", &["/d", "/a"])
            .page("/d", &[]);
        let log = site.log();
        let crawler = coordinator(site, CrawlConfig::default().with_workers(4));

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 4);
        assert_eq!(fetch_count(&log, "/d"), 1);
        assert_eq!(fetch_count(&log, "/a"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_seed_enqueued_twice_fetched_once() {
        let site = StubSite::new().page("/a", &[]);
        let log = site.log();
        let crawler = coordinator(site, CrawlConfig::default().with_workers(3));

        let frontier = Arc::new(crawler.new_frontier());
        assert!(frontier.enqueue(&at("/a")));
        assert!(!frontier.enqueue(&at("/a")));

        let report = crawler.run(frontier, CancellationToken::new()).await;

        assert_eq!(report.stats.pages_fetched, 1);
        assert_eq!(fetch_count(&log, "/a"), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_late_link_is_not_lost() {
        // While /a is slow the other workers see an empty queue; they must
        // wait for /a's links instead of declaring the crawl done.
        let site = StubSite::new()
            .page("/a", &["/b"])
            .slow("/a", 100)
            .page("/b", &["/c"])
            .slow("/b", 50)
            .page("/c", &[]);
        let crawler = coordinator(site, CrawlConfig::default().with_workers(3));

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 3);
        assert_eq!(report.stats.stop_reason, StopReason::Exhausted);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_waits_for_in_flight_pages() {
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let site = StubSite::new()
            .page("/a", &["/s1", "/s2"])
            .page("/s1", &["/t1"])
            .page("/s2", &["/t2"])
            .page("/t1", &[])
            .page("/t2", &[])
            .gated("/s1", started_tx.clone())
            .gated("/s2", started_tx);
        let gate = Arc::clone(&site.gate);
        let log = site.log();
        let crawler = coordinator(site, CrawlConfig::default().with_workers(4));

        let frontier = Arc::new(crawler.new_frontier());
        frontier.enqueue(&at("/a"));
        let cancel = CancellationToken::new();

        let run = {
            let frontier = Arc::clone(&frontier);
            let cancel = cancel.clone();
            tokio::spawn(async move { crawler.run(frontier, cancel).await })
        };

        // Two workers are now blocked mid-fetch
        started_rx.recv().await.unwrap();
        started_rx.recv().await.unwrap();

        cancel.cancel();
        while frontier.stop_reason().is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(!run.is_finished());

        gate.add_permits(2);
        let report = run.await.unwrap();

        assert_eq!(report.stats.stop_reason, StopReason::Cancelled);
        assert_eq!(report.stats.pages_fetched, 3);
        assert_eq!(fetch_count(&log, "/t1"), 0);
        assert_eq!(fetch_count(&log, "/t2"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_page_limit_stops_crawl() {
        let site = StubSite::new()
            .page("/a", &["/b"])
            .page("/b", &["/c"])
            .page("/c", &["/d"])
            .page("/d", &[]);
        let config = CrawlConfig::default().with_workers(2).with_max_pages(2);
        let crawler = coordinator(site, config);

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 2);
        assert_eq!(report.stats.stop_reason, StopReason::PageLimit);
        assert_eq!(report.stats.discarded, 1);
        assert!(!report.is_clean());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_page_limit_met_exactly_is_clean() {
        let site = StubSite::new().page("/a", &["/b"]).page("/b", &[]);
        let config = CrawlConfig::default().with_workers(2).with_max_pages(2);
        let crawler = coordinator(site, config);

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 2);
        assert_eq!(report.stats.stop_reason, StopReason::Exhausted);
        assert_eq!(report.stats.discarded, 0);
        assert!(report.is_clean());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_deadline_stops_crawl() {
        let site = StubSite::new()
            .page("/a", &["/b"])
            .slow("/a", 200)
            .page("/b", &[]);
        let config = CrawlConfig::default()
            .with_workers(2)
            .with_deadline(Duration::from_millis(50));
        let log = site.log();
        let crawler = coordinator(site, config);

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.stop_reason, StopReason::Deadline);
        assert_eq!(report.stats.pages_fetched, 1);
        assert_eq!(fetch_count(&log, "/b"), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_malformed_links_skipped() {
        let site = StubSite::new()
            .page("/a", &["mailto:x@example.test", "http://[::1", "/ok"])
            .page("/ok", &[]);
        let crawler = coordinator(site, CrawlConfig::default().with_workers(2));

        let report = crawler.run_crawl(&at("/a")).await.unwrap();

        assert_eq!(report.stats.pages_fetched, 2);
        assert_eq!(report.stats.skipped_links, 2);
        assert_eq!(report.stats.links_discovered, 3);
        assert_eq!(report.stats.errors, 0);
    }

    #[tokio::test]
    async fn test_bad_seed_is_fatal() {
        let crawler = coordinator(StubSite::new(), CrawlConfig::default());
        let err = crawler.run_crawl("ftp://example.test/").await.unwrap_err();
        assert!(matches!(err, CrawlError::MalformedUrl { .. }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CrawlConfig::default().with_workers(0);
        let result = Coordinator::new(StubSite::new(), LineParser, config);
        assert!(matches!(result, Err(ConfigError::NoWorkers)));
    }
}
