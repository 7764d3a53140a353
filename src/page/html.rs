// src/page/html.rs
// =============================================================================
// The default parser: pulls the title, the visible text and every <a href>
// out of an HTML document using the `scraper` crate.
//
// Links are resolved against the page URL the way a browser would
// ("/docs" on https://example.com/page -> https://example.com/docs).
// An href the url crate cannot resolve is kept as written; the frontier
// rejects it later and counts it as a skipped link.
// =============================================================================

use super::{Page, Parse};
use crate::error::ParseError;
use scraper::{Html, Selector};
use url::Url;

pub struct HtmlParser {
    title: Selector,
    body: Selector,
    links: Selector,
}

fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css.to_string()))
}

impl HtmlParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            title: selector("title")?,
            body: selector("body")?,
            links: selector("a[href]")?,
        })
    }
}

impl Parse for HtmlParser {
    fn parse(&self, url: &Url, body: &str) -> Result<Page, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let document = Html::parse_document(body);

        let title = document
            .select(&self.title)
            .next()
            .map(|title| collapse_whitespace(title.text()))
            .filter(|title| !title.is_empty());

        let text = document
            .select(&self.body)
            .next()
            .map(|body| collapse_whitespace(body.text()))
            .unwrap_or_default();

        let links = document
            .select(&self.links)
            .filter_map(|element| element.value().attr("href"))
            .filter(|href| !is_non_navigational(href))
            .map(|href| match url.join(href) {
                Ok(resolved) => resolved.to_string(),
                Err(_) => href.to_string(),
            })
            .collect();

        Ok(Page {
            url: url.to_string(),
            title,
            body: text,
            links,
        })
    }
}

// In-page anchors and non-web schemes are not links to crawl at all, so they
// never reach the frontier (and are not counted as skipped).
fn is_non_navigational(href: &str) -> bool {
    let href = href.trim();
    href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
