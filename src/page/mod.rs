// src/page/mod.rs
// =============================================================================
// Everything the crawler needs from the outside world, behind two traits:
//
// - Fetch: download one URL (default: HttpFetcher, built on reqwest)
// - Parse: turn a downloaded body into a Page (default: HtmlParser, scraper)
//
// The crawl coordinator only talks to these traits, so tests can swap in
// in-memory fakes and never touch the network.
// =============================================================================

mod html;
mod http;

pub use html::HtmlParser;
pub use http::HttpFetcher;

use crate::error::{FetchError, ParseError};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// Raw result of fetching one URL
#[derive(Debug, Clone)]
pub struct Document {
    pub status: u16,
    /// Header names are lower-case, as reqwest hands them out
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl Document {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

/// A fetched and parsed page. Never modified after the parser returns it.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    /// Links in document order, resolved against `url` where possible
    pub links: Vec<String>,
}

#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError>;
}

/// Parsing is CPU-bound; the worker runs it on tokio's blocking pool.
pub trait Parse: Send + Sync + 'static {
    fn parse(&self, url: &Url, body: &str) -> Result<Page, ParseError>;
}
