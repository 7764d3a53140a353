// src/crawl/frontier.rs
// =============================================================================
// The frontier: every URL the crawl has discovered, and the ones still
// waiting to be fetched.
//
// How it works:
// 1. enqueue() normalizes a URL and checks it against the "seen" set
// 2. New URLs go to the back of a FIFO queue (breadth-first order)
// 3. Workers call dequeue() and get a Claim for the oldest URL
// 4. While a worker holds a Claim it counts as "active"
// 5. The crawl is over when the queue is empty AND no worker is active
//
// Step 5 is why the active counter lives here, under the same lock as the
// queue: an active worker may still discover new links, so an empty queue on
// its own does not mean we are done.
//
// Rust concepts:
// - Mutex: one lock guards the seen set, the queue and the counters together
// - Notify: lets idle workers sleep until something changes
// - Drop: a Claim gives its "active" slot back when it goes out of scope
// =============================================================================

use super::link;
use crate::error::CrawlError;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// Why a crawl stopped handing out work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Queue empty and every worker idle: the normal ending
    Exhausted,
    /// The cancellation token was triggered
    Cancelled,
    /// The configured maximum number of pages was claimed
    PageLimit,
    /// The configured wall-clock deadline passed
    Deadline,
}

#[derive(Debug, Default)]
struct State {
    seen: HashSet<String>,
    pending: VecDeque<String>,
    active: usize,
    claimed: usize,
    skipped: usize,
    discarded: usize,
    stopped: Option<StopReason>,
}

impl State {
    fn stop(&mut self, reason: StopReason) {
        self.stopped = Some(reason);
        self.discarded += self.pending.len();
        self.pending.clear();
    }
}

// Outcome of one attempt to take work from the queue
enum Next {
    Url(String),
    Stop,
    Wait,
}

pub struct Frontier {
    state: Mutex<State>,
    changed: Notify,
    max_claims: Option<usize>,
}

/// A URL handed to one worker. Dropping it marks that worker idle again.
pub struct Claim<'a> {
    url: String,
    frontier: &'a Frontier,
}

impl Claim<'_> {
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.frontier.release();
    }
}

impl std::fmt::Debug for Frontier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("Frontier")
            .field("pending", &state.pending.len())
            .field("seen", &state.seen.len())
            .field("active", &state.active)
            .field("stopped", &state.stopped)
            .finish()
    }
}

impl Default for Frontier {
    fn default() -> Self {
        Self::new()
    }
}

impl Frontier {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            changed: Notify::new(),
            max_claims: None,
        }
    }

    /// A frontier that stops after `limit` URLs have been handed out
    pub fn with_page_limit(limit: usize) -> Self {
        Self {
            max_claims: Some(limit),
            ..Self::new()
        }
    }

    // Every update under this lock is a single push/pop/counter bump, so a
    // poisoned mutex still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an absolute URL. Returns true only the first time a URL is seen.
    pub fn enqueue(&self, url: &str) -> bool {
        self.admit(link::normalize(url))
    }

    /// Adds a link found on `base`, resolving it first if it is relative.
    pub fn enqueue_link(&self, base: &Url, href: &str) -> bool {
        self.admit(link::resolve(base, href))
    }

    fn admit(&self, url: Result<Url, CrawlError>) -> bool {
        let mut state = self.lock();

        // Once closed, nothing is considered, so nothing is counted either
        if state.stopped.is_some() {
            return false;
        }

        let url = match url {
            Ok(url) => url,
            Err(e) => {
                state.skipped += 1;
                tracing::debug!(error = %e, "skipping link");
                return false;
            }
        };

        // Check and insert in one step, under the lock
        if !state.seen.insert(url.as_str().to_owned()) {
            return false;
        }
        state.pending.push_back(url.into());
        drop(state);

        self.changed.notify_waiters();
        true
    }

    /// Waits for the next URL to crawl.
    ///
    /// Returns `None` once the crawl is over: either the queue is empty with
    /// no worker active, or the frontier was closed.
    pub async fn dequeue(&self) -> Option<Claim<'_>> {
        loop {
            // Register for wake-ups *before* looking at the state, so a
            // notify_waiters() between the check and the await is not lost.
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            match self.try_claim() {
                Next::Url(url) => {
                    return Some(Claim {
                        url,
                        frontier: self,
                    })
                }
                Next::Stop => return None,
                Next::Wait => notified.await,
            }
        }
    }

    fn try_claim(&self) -> Next {
        let mut state = self.lock();

        if state.stopped.is_some() {
            return Next::Stop;
        }

        if state.pending.is_empty() {
            if state.active > 0 {
                return Next::Wait;
            }
            state.stopped = Some(StopReason::Exhausted);
            drop(state);
            self.changed.notify_waiters();
            return Next::Stop;
        }

        if self.max_claims.is_some_and(|max| state.claimed >= max) {
            state.stop(StopReason::PageLimit);
            drop(state);
            self.changed.notify_waiters();
            return Next::Stop;
        }

        match state.pending.pop_front() {
            Some(url) => {
                state.active += 1;
                state.claimed += 1;
                Next::Url(url)
            }
            None => Next::Wait,
        }
    }

    fn release(&self) {
        let mut state = self.lock();
        state.active = state.active.saturating_sub(1);
        let idle = state.active == 0;
        drop(state);

        // The last active worker going idle may end the crawl
        if idle {
            self.changed.notify_waiters();
        }
    }

    /// Stops handing out work and drops every URL still queued.
    ///
    /// Workers that hold a Claim finish their current page; everyone else
    /// gets `None` from dequeue(). Returns false if the frontier had already
    /// stopped.
    pub fn close(&self, reason: StopReason) -> bool {
        let mut state = self.lock();
        if state.stopped.is_some() {
            return false;
        }
        state.stop(reason);
        drop(state);

        self.changed.notify_waiters();
        true
    }

    /// Number of URLs waiting to be fetched
    pub fn size(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn seen_count(&self) -> usize {
        self.lock().seen.len()
    }

    /// Links rejected as malformed
    pub fn skipped(&self) -> usize {
        self.lock().skipped
    }

    /// URLs that were queued but never claimed because the frontier closed
    pub fn discarded(&self) -> usize {
        self.lock().discarded
    }

    pub fn active(&self) -> usize {
        self.lock().active
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.lock().stopped
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why std::sync::Mutex and not tokio::sync::Mutex?
//    - We never hold the lock across an .await
//    - Each critical section is a few pointer-sized updates
//    - A plain Mutex is faster there and can't be held by a sleeping task
//
// 2. What does notified().enable() do?
//    - Notify::notify_waiters() only wakes futures that are already waiting
//    - enable() registers our future *before* we inspect the queue
//    - So a push that lands between "queue looks empty" and ".await" still
//      wakes us instead of being missed
//
// 3. Why is Claim tied to the frontier's lifetime ('a)?
//    - It holds &Frontier so its Drop can call release()
//    - The borrow checker guarantees the frontier outlives every Claim
//
// 4. What is saturating_sub?
//    - Subtraction that stops at 0 instead of panicking on underflow
// -----------------------------------------------------------------------------
