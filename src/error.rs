// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// Every failure a single page can cause is recoverable: the worker that hit
// it records the error and moves on to the next URL. None of these errors
// ever stops a crawl on its own.
//
// - FetchError: network failure, timeout, or a non-2xx status
// - ParseError: the fetched document could not be turned into a Page
// - CrawlError: umbrella type, also covering links that cannot be resolved
// =============================================================================

use thiserror::Error;

/// Errors produced while downloading a document
#[derive(Error, Debug)]
pub enum FetchError {
    /// The server answered with a status outside 200-299
    #[error("HTTP {0}")]
    Status(u16),

    /// The request did not finish within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// The redirect chain was too long or looped
    #[error("too many redirects")]
    Redirect,

    /// DNS failure, refused connection, TLS handshake problem, ...
    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else reqwest reports (body decoding, protocol errors)
    #[error("request failed: {0}")]
    Request(String),
}

impl FetchError {
    /// Sorts a reqwest error into one of our variants.
    pub fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else if error.is_redirect() {
            FetchError::Redirect
        } else if error.is_connect() {
            FetchError::Connect(error.to_string())
        } else if let Some(status) = error.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(error.to_string())
        }
    }
}

/// Errors produced while turning a document into a Page
#[derive(Error, Debug)]
pub enum ParseError {
    /// The body was empty or whitespace only
    #[error("empty document")]
    Empty,

    /// The parser task panicked or was cancelled
    #[error("parser task failed: {0}")]
    Task(String),

    /// A CSS selector the parser relies on did not compile
    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Umbrella error for everything a crawl can run into
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    /// A link (or the seed) that cannot become an absolute http(s) URL
    #[error("malformed URL '{url}': {reason}")]
    MalformedUrl { url: String, reason: String },
}

impl CrawlError {
    pub fn malformed(url: impl Into<String>, reason: impl ToString) -> Self {
        CrawlError::MalformedUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label used in reports ("fetch", "parse", "url")
    pub fn kind(&self) -> &'static str {
        match self {
            CrawlError::Fetch(_) => "fetch",
            CrawlError::Parse(_) => "parse",
            CrawlError::MalformedUrl { .. } => "url",
        }
    }
}
