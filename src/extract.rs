// src/extract.rs
// =============================================================================
// This module digs URLs and email addresses out of a fetched page.
//
// How it works:
// 1. Refuse anything that is not text (images, PDFs, ...) - callers treat
//    ContentNotSearchable as "nothing found", not as a failure
// 2. Decode the body leniently (invalid UTF-8 sequences are replaced)
// 3. Parse the HTML with scraper and re-serialize it, so the regexes see a
//    consistent rendering of the markup
// 4. URLs = bare literals matched in the markup + href attributes of every
//    <a> tag (empty and mailto: values excluded), absolutized against the
//    page they were found on
// 5. Emails = regex matches over the markup, deduplicated
//
// Extraction is pure: no network access, no shared state.
// =============================================================================

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use thiserror::Error;

use crate::urls::resolve_url;

// Email: letters/digits/._+- local part, then letters/digits/-/. domain
// with at least one dot.
static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    // Constant pattern, known valid - a panic here is a programmer error
    Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+").unwrap()
});

// Bare URL literal: scheme, dotted host, then any run of common URL
// characters that does not end in punctuation like '.' or ','.
static RE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:http|https|ftp)://[\w-]+(?:\.[\w-]+)+(?:[\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-])?")
        .unwrap()
});

/// Raised when a page's content-type is absent or not `text/*`.
#[derive(Debug, Error)]
#[error("content type {content_type:?} is not searchable")]
pub struct ContentNotSearchable {
    pub content_type: Option<String>,
}

/// Everything worth keeping from one page.
#[derive(Debug, Default)]
pub struct Findings {
    /// Absolute URLs discovered on the page, not yet normalized or filtered.
    pub urls: HashSet<String>,
    /// Email addresses found anywhere in the markup.
    pub emails: HashSet<String>,
}

/// True when the content-type indicates something our regexes can search.
pub fn is_textual(content_type: Option<&str>) -> bool {
    content_type
        .map(|value| value.trim_start().starts_with("text"))
        .unwrap_or(false)
}

// Extracts outbound links and email addresses from a page body.
//
// Parameters:
//   body: raw response bytes
//   content_type: the Content-Type header, if the server sent one
//   page_url: the URL the body was fetched from (for absolutizing links)
pub fn extract(
    body: &[u8],
    content_type: Option<&str>,
    page_url: &str,
) -> Result<Findings, ContentNotSearchable> {
    if !is_textual(content_type) {
        return Err(ContentNotSearchable {
            content_type: content_type.map(str::to_string),
        });
    }

    let text = String::from_utf8_lossy(body);
    let document = Html::parse_document(&text);
    let markup = document.root_element().html();

    let mut raw_urls: HashSet<String> = RE_URL
        .find_iter(&markup)
        .map(|m| m.as_str().to_string())
        .collect();

    // Constant selector, known valid
    let anchors = Selector::parse("a[href]").unwrap();
    for element in document.select(&anchors) {
        if let Some(href) = element.value().attr("href") {
            if href.is_empty() || href.starts_with("mailto:") {
                continue;
            }
            raw_urls.insert(href.to_string());
        }
    }

    // Relative hrefs become absolute here; anything that cannot be resolved
    // against the page URL is dropped on the floor
    let urls = raw_urls
        .into_iter()
        .filter_map(|candidate| resolve_url(page_url, &candidate))
        .collect();

    let emails = RE_EMAIL
        .find_iter(&markup)
        .map(|m| m.as_str().to_string())
        .collect();

    Ok(Findings { urls, emails })
}
