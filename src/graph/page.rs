// src/graph/page.rs
// =============================================================================
// A Page is the canonical representation of one crawled (or merely
// discovered) URL.
//
// Identity rules:
// - a Page is keyed by its *normalized* URL, fixed at construction
// - equality and hashing use the URL exclusively, so a bare reference and
//   a fully loaded page with the same URL are the same page
//
// A page starts as a bare reference. Once a worker has fetched it, the
// orchestrator attaches the response via load(). Asking a page for its
// status or body before that yields NotLoadedError instead of panicking -
// the explicit replacement for "attribute passthrough and hope".
// =============================================================================

use std::hash::{Hash, Hasher};

use thiserror::Error;

use crate::fetch::FetchedPage;

/// Asked a page for response data before any fetch completed for it.
#[derive(Debug, Error)]
#[error("page {url} has not been loaded yet")]
pub struct NotLoadedError {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Page {
    url: String,
    fetched: Option<FetchedPage>,
}

impl Page {
    /// Creates a bare, unloaded page. The URL must already be normalized -
    /// the graph is the only place pages are created, and it guarantees it.
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            fetched: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_loaded(&self) -> bool {
        self.fetched.is_some()
    }

    /// Attaches (or replaces, on refetch) the fetched response.
    pub(crate) fn load(&mut self, fetched: FetchedPage) {
        self.fetched = Some(fetched);
    }

    pub fn status(&self) -> Result<u16, NotLoadedError> {
        self.response().map(|fetched| fetched.status)
    }

    pub fn content_type(&self) -> Result<Option<&str>, NotLoadedError> {
        self.response()
            .map(|fetched| fetched.content_type.as_deref())
    }

    pub fn body(&self) -> Result<&[u8], NotLoadedError> {
        self.response().map(|fetched| fetched.body.as_slice())
    }

    fn response(&self) -> Result<&FetchedPage, NotLoadedError> {
        self.fetched.as_ref().ok_or_else(|| NotLoadedError {
            url: self.url.clone(),
        })
    }
}

// Equality and hash on the normalized URL only
impl PartialEq for Page {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Page {}

impl Hash for Page {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}
