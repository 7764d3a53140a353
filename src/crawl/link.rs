// src/crawl/link.rs
// =============================================================================
// URL normalization for the frontier.
//
// Every URL that enters the frontier goes through here first, so the
// deduplication set only ever sees one spelling of each page:
// - relative links are resolved against the page they were found on
// - the #fragment is dropped (same document, different scroll position)
// - only http/https URLs with a host are accepted
//
// The url crate already lower-cases scheme and host and removes default
// ports while parsing.
// =============================================================================

use crate::error::CrawlError;
use url::Url;

/// Normalizes an absolute URL (the seed, or a link that is already absolute)
pub fn normalize(raw: &str) -> Result<Url, CrawlError> {
    let parsed = Url::parse(raw.trim()).map_err(|e| CrawlError::malformed(raw, e))?;
    finish(parsed, raw)
}

/// Resolves a possibly-relative link against the page it appeared on
pub fn resolve(base: &Url, href: &str) -> Result<Url, CrawlError> {
    let joined = base
        .join(href.trim())
        .map_err(|e| CrawlError::malformed(href, e))?;
    finish(joined, href)
}

fn finish(mut url: Url, raw: &str) -> Result<Url, CrawlError> {
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(CrawlError::malformed(
                raw,
                format!("unsupported scheme '{}'", other),
            ))
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(CrawlError::malformed(raw, "missing host"));
    }

    url.set_fragment(None);
    Ok(url)
}
