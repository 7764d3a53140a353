// src/crawl/worker.rs
// =============================================================================
// One member of the worker pool.
//
// Loop:
//   Idle -> (claim a URL) -> Fetching -> Parsing -> (enqueue links) -> Idle
//
// A worker reaches Stopped when the frontier tells it there is no more work,
// either because the crawl is finished or because it was stopped early.
// A failed fetch or parse is recorded and the loop carries on.
// =============================================================================

use super::frontier::Frontier;
use super::stats::{PageFailure, WorkerReport};
use crate::error::{CrawlError, ParseError};
use crate::page::{Fetch, Page, Parse};
use std::sync::Arc;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Fetching,
    Parsing,
    Stopped,
}

pub(crate) struct Worker<F, P> {
    id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    parser: Arc<P>,
    state: WorkerState,
}

impl<F: Fetch, P: Parse> Worker<F, P> {
    pub(crate) fn new(id: usize, frontier: Arc<Frontier>, fetcher: Arc<F>, parser: Arc<P>) -> Self {
        Self {
            id,
            frontier,
            fetcher,
            parser,
            state: WorkerState::Idle,
        }
    }

    fn set_state(&mut self, state: WorkerState) {
        tracing::trace!(worker = self.id, from = ?self.state, to = ?state, "worker state");
        self.state = state;
    }

    pub(crate) async fn run(mut self) -> WorkerReport {
        let mut report = WorkerReport::default();
        let frontier = Arc::clone(&self.frontier);

        while let Some(claim) = frontier.dequeue().await {
            match self.process(claim.url()).await {
                Ok((base, page)) => {
                    report.links_discovered += page.links.len();
                    // Links go in before the claim is released, so the
                    // frontier never sees "empty and idle" while they exist
                    for href in &page.links {
                        if frontier.enqueue_link(&base, href) {
                            report.links_enqueued += 1;
                        }
                    }
                    tracing::info!(
                        worker = self.id,
                        url = %page.url,
                        links = page.links.len(),
                        queued = frontier.size(),
                        "page crawled"
                    );
                    report.pages.push(page);
                }
                Err(e) => {
                    tracing::warn!(worker = self.id, url = claim.url(), error = %e, "page failed");
                    report.failures.push(PageFailure::new(claim.url(), &e));
                }
            }

            drop(claim);
            self.set_state(WorkerState::Idle);
        }

        self.set_state(WorkerState::Stopped);
        tracing::debug!(
            worker = self.id,
            pages = report.pages.len(),
            errors = report.failures.len(),
            "worker stopped"
        );
        report
    }

    async fn process(&mut self, raw: &str) -> Result<(Url, Page), CrawlError> {
        // Everything in the frontier is already normalized
        let url = Url::parse(raw).map_err(|e| CrawlError::malformed(raw, e))?;

        self.set_state(WorkerState::Fetching);
        let document = self.fetcher.fetch(&url).await?;
        tracing::debug!(
            worker = self.id,
            url = %url,
            status = document.status,
            content_type = document.content_type().unwrap_or("-"),
            "fetched"
        );

        self.set_state(WorkerState::Parsing);
        let parser = Arc::clone(&self.parser);
        let base = url.clone();
        let page = tokio::task::spawn_blocking(move || parser.parse(&url, &document.body))
            .await
            .map_err(|e| ParseError::Task(e.to_string()))??;

        Ok((base, page))
    }
}
