// src/urls.rs
// =============================================================================
// URL normalization helpers.
//
// Every URL that enters the crawler goes through normalize_url() first, so
// that two spellings of the same page collide in the visited set and in the
// site graph:
// - query string and fragment are stripped ("?x=1#top" never matters)
// - the path is percent-escaped (the url crate does this on parse)
// - an empty path becomes "/"
//
// Relative hyperlinks are resolved against the page they were found on with
// resolve_url() *before* normalization.
//
// Rust concepts:
// - Result<T, E>: malformed candidates yield InvalidUrl and get dropped
// - The url crate: parsing, joining and serializing URLs like a browser
// =============================================================================

use thiserror::Error;
use url::Url;

/// A candidate URL that could not be parsed (or uses a scheme we never
/// crawl, like `javascript:` or `mailto:`).
///
/// The orchestrator drops these silently - a malformed link on a page is
/// never a reason to fail the crawl.
#[derive(Debug, Error)]
#[error("invalid url: {url}")]
pub struct InvalidUrl {
    pub url: String,
}

// Schemes the crawler is willing to keep. Everything else (javascript:,
// data:, tel:, ...) is rejected at normalization time.
const CRAWLABLE_SCHEMES: [&str; 3] = ["http", "https", "ftp"];

// Canonicalizes a URL string.
//
// Idempotent: normalize_url(normalize_url(u)) == normalize_url(u), because
// the url crate always serializes to the same canonical form and the query
// and fragment are gone after the first pass.
pub fn normalize_url(raw: &str) -> Result<String, InvalidUrl> {
    let mut parsed = Url::parse(raw.trim()).map_err(|_| InvalidUrl {
        url: raw.to_string(),
    })?;

    if !CRAWLABLE_SCHEMES.contains(&parsed.scheme()) {
        return Err(InvalidUrl {
            url: raw.to_string(),
        });
    }

    parsed.set_query(None);
    parsed.set_fragment(None);

    // Url::to_string() percent-escapes the path and renders an empty path
    // on http(s) URLs as "/"
    Ok(parsed.to_string())
}

// Resolves a possibly-relative URL to an absolute one.
//
// Parameters:
//   base: the URL of the page the candidate was found on
//   candidate: the href value (might be "/about", "../x" or absolute)
//
// Returns: Some(absolute_url) or None when either side is unparseable
pub fn resolve_url(base: &str, candidate: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(candidate.trim()).ok()?;
    Some(joined.to_string())
}

// Returns the network location ("host" or "host:port") of a URL.
//
// The port is included only when it is explicit in the URL, so
// "http://example.com" and "http://example.com:80" have different netlocs.
// This is what the within-domain filter compares.
pub fn netloc(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
