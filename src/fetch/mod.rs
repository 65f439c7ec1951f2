// src/fetch/mod.rs
// =============================================================================
// This module owns the boundary between the crawler and the network.
//
// The orchestrator never talks to reqwest directly - it goes through the
// Fetcher trait, which has exactly two operations:
// - fetch():      GET the page, returning status, content-type and body bytes
// - fetch_head(): metadata-only variant used to pre-check the content-type
//                 before downloading a body we would throw away anyway
//
// Tests swap in an in-memory fetcher, which is how we crawl a synthetic
// website without a web server.
//
// Rust concepts:
// - Traits: the seam that lets tests replace the HTTP client
// - async-trait: async functions in object-safe traits
// =============================================================================

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use thiserror::Error;

/// What a fetch can fail with.
///
/// A failed fetch never aborts the crawl: the worker that hits one of these
/// reports an empty contribution and the page is still marked visited, so it
/// is never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request itself failed (connect error, timeout, TLS, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status code.
    #[error("HTTP {0}")]
    Status(u16),
}

/// A successfully fetched page.
///
/// For the HEAD variant the body is empty - only status and content-type
/// are meaningful.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// The crawl orchestrator's view of the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs a full GET of the given URL.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Lightweight metadata-only request (no body download).
    async fn fetch_head(&self, url: &str) -> Result<FetchedPage, FetchError>;
}
