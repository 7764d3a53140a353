// src/page/http.rs
// =============================================================================
// The default fetcher: plain GET requests through one shared reqwest Client.
//
// - One Client for the whole crawl (connection pooling)
// - Per-request timeout and user agent come from CrawlConfig
// - Redirects are followed, up to 5 hops
// - Anything outside 2xx becomes FetchError::Status
//
// No retries: a failed fetch is reported once and the worker moves on.
// =============================================================================

use super::{Document, Fetch};
use crate::config::CrawlConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use reqwest::{redirect, Client};
use url::Url;

const MAX_REDIRECTS: usize = 5;

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(FetchError::from_reqwest)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<Document, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // Headers that are not valid UTF-8 are left out
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response.text().await.map_err(FetchError::from_reqwest)?;

        Ok(Document {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}
