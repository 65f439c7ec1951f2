// src/crawl/worker.rs
// =============================================================================
// The job a worker runs for one dispatched page: fetch it, extract from it,
// report what was found.
//
// Error policy (the whole of it):
// - a failed HEAD is not conclusive - some servers only speak GET
// - a failed GET means an empty contribution; the page still counts as
//   visited so it is never retried
// - non-text content means an empty contribution too
// Nothing a worker hits can abort the crawl or touch another page.
// =============================================================================

use log::{debug, warn};

use crate::extract::{self, Findings};
use crate::fetch::{FetchedPage, Fetcher};

/// What one worker hands back to the control loop.
pub(crate) struct PageOutcome {
    /// The response, when any fetch succeeded (HEAD-only for non-text pages).
    pub fetched: Option<FetchedPage>,
    /// Links and emails found on the page; empty on any failure.
    pub findings: Findings,
}

impl PageOutcome {
    fn empty(fetched: Option<FetchedPage>) -> Self {
        Self {
            fetched,
            findings: Findings::default(),
        }
    }
}

// Fetches and searches a single page. Never fails: every failure mode
// collapses into an empty outcome.
pub(crate) async fn search_page(fetcher: &dyn Fetcher, url: &str) -> PageOutcome {
    // Metadata-only pre-check: don't download bodies we cannot search
    match fetcher.fetch_head(url).await {
        Ok(head) if !extract::is_textual(head.content_type.as_deref()) => {
            debug!("skipping non-text content at {} ({:?})", url, head.content_type);
            return PageOutcome::empty(Some(head));
        }
        Ok(_) => {}
        Err(error) => debug!("HEAD {} failed ({}), trying GET anyway", url, error),
    }

    let page = match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(error) => {
            warn!("failed to fetch {}: {}", url, error);
            return PageOutcome::empty(None);
        }
    };

    match extract::extract(&page.body, page.content_type.as_deref(), url) {
        Ok(findings) => {
            debug!(
                "{}: {} links, {} emails",
                url,
                findings.urls.len(),
                findings.emails.len()
            );
            PageOutcome {
                fetched: Some(page),
                findings,
            }
        }
        // The GET disagreed with the HEAD about the content-type
        Err(reason) => {
            debug!("{}: {}", url, reason);
            PageOutcome::empty(Some(page))
        }
    }
}
