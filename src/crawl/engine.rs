// src/crawl/engine.rs
// =============================================================================
// The crawl control loop.
//
// How it works:
// 1. Dispatch the root page to a worker
// 2. Wait for any worker to finish (a completion channel, never polling)
// 3. Collect: merge the finished page's links into the site graph, bank its
//    emails, mark it visited
// 4. Discover: ask the graph for every page within max_depth hops of root
// 5. Admit: subtract visited and in-progress pages, run the filter chain,
//    dispatch the survivors
// 6. Repeat until nothing is in flight
//
// Concurrency model:
// - this loop is the ONLY code that touches the graph, the frontier and the
//   accumulators, so none of them need locks
// - workers run as tokio tasks gated by a semaphore of max_workers permits;
//   each produces exactly one (url, outcome) message and never touches
//   shared state
// - a page can never be dispatched twice: admission checks visited AND
//   in-progress membership here, against the current snapshot, in the same
//   single-threaded step that dispatches
//
// Cancellation:
// - an interrupt flips the watch channel; the loop stops admitting at once,
//   keeps draining whatever is in flight, and returns the partial result
// =============================================================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;
use tokio::sync::{mpsc, watch, Semaphore};

use crate::fetch::Fetcher;
use crate::filters::{self, FilterChain};
use crate::graph::SiteGraph;
use crate::urls::{normalize_url, InvalidUrl};

use super::worker::{search_page, PageOutcome};

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("cannot start crawl: {0}")]
    InvalidRoot(#[from] InvalidUrl),
}

/// Knobs for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Upper bound on simultaneous fetches.
    pub max_workers: usize,
    /// Pages farther than this many hops from the root are never fetched.
    pub max_depth: usize,
    /// Restrict the crawl to the root page's host[:port].
    pub within_domain: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_workers: 5,
            max_depth: 1,
            within_domain: true,
        }
    }
}

/// Everything one crawl produced. Partial but valid when `interrupted`.
pub struct CrawlResult {
    /// The normalized URL the crawl started from.
    pub root: String,
    /// The page-relationship graph, including discovered-but-unvisited pages.
    pub graph: SiteGraph,
    /// Normalized URLs of every page a worker completed (fetched or failed).
    pub visited: HashSet<String>,
    /// Emails keyed by the page they were found on.
    pub emails_by_page: HashMap<String, HashSet<String>>,
    /// True when the crawl was cut short by an interrupt.
    pub interrupted: bool,
}

impl CrawlResult {
    /// All discovered emails, across every visited page.
    pub fn emails(&self) -> HashSet<String> {
        self.emails_by_page
            .values()
            .flatten()
            .cloned()
            .collect()
    }
}

/// The crawl orchestrator. Holds only the fetcher; all per-run state lives
/// inside crawl(), so one Crawler can run many independent crawls.
pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Crawls outward from root_url until the frontier is exhausted, the
    /// depth bound stops producing candidates, or `cancel` fires.
    pub async fn crawl(
        &self,
        root_url: &str,
        options: &CrawlOptions,
        mut chain: FilterChain,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<CrawlResult, CrawlError> {
        let root = normalize_url(root_url)?;

        // Every run gets a fresh chain; the built-in domain filter goes last
        // so caller-supplied filters run first, in registration order
        if options.within_domain {
            chain.add(filters::within_domain(&root));
        }

        info!(
            "starting crawl at {} (max depth {}, {} workers)",
            root, options.max_depth, options.max_workers
        );

        let semaphore = Arc::new(Semaphore::new(options.max_workers.max(1)));
        let (tx, mut rx) = mpsc::unbounded_channel::<(String, PageOutcome)>();

        let mut graph = SiteGraph::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut in_progress: HashSet<String> = HashSet::new();
        let mut emails_by_page: HashMap<String, HashSet<String>> = HashMap::new();
        let mut interrupted = false;
        // Flips off if the cancel sender goes away, so the select loop does
        // not spin on a closed channel
        let mut cancel_armed = true;

        graph.add_page(&root, None);
        dispatch(&self.fetcher, &semaphore, &tx, &mut in_progress, root.clone());

        while !in_progress.is_empty() {
            let (url, outcome) = tokio::select! {
                biased;
                changed = cancel.changed(), if cancel_armed && !interrupted => {
                    match changed {
                        Ok(()) => {
                            if *cancel.borrow_and_update() {
                                info!(
                                    "interrupt received, draining {} in-flight fetches",
                                    in_progress.len()
                                );
                                interrupted = true;
                            }
                        }
                        Err(_) => cancel_armed = false,
                    }
                    continue;
                }
                message = rx.recv() => match message {
                    Some(pair) => pair,
                    // Unreachable while we hold tx, but never worth a panic
                    None => break,
                },
            };

            // Collect: this page is done, whatever happened to it
            in_progress.remove(&url);
            visited.insert(url.clone());

            for link in outcome.findings.urls {
                match normalize_url(&link) {
                    Ok(normalized) => graph.add_relation(&url, &normalized),
                    Err(invalid) => debug!("dropping link on {}: {}", url, invalid),
                }
            }
            if let Some(fetched) = outcome.fetched {
                graph.mark_loaded(&url, fetched);
            }
            emails_by_page
                .entry(url)
                .or_default()
                .extend(outcome.findings.emails);

            if interrupted {
                continue;
            }

            // Discover: everything the graph now connects within the depth
            // bound. Pages at exactly max_depth still show up here (and get
            // visited); their own links land beyond the bound and never do.
            let candidates: Vec<String> = graph
                .find_nearest_neighbours(&root, options.max_depth)
                .iter()
                .map(|page| page.url().to_string())
                .collect();

            // Admit: not seen, not in flight, and past every filter
            for candidate in candidates {
                if visited.contains(&candidate) || in_progress.contains(&candidate) {
                    continue;
                }
                if !chain.accepts(&candidate) {
                    continue;
                }
                dispatch(&self.fetcher, &semaphore, &tx, &mut in_progress, candidate);
            }
        }

        info!(
            "crawl finished: {} pages visited, {} emails{}",
            visited.len(),
            emails_by_page.values().flatten().count(),
            if interrupted { " (interrupted)" } else { "" }
        );

        Ok(CrawlResult {
            root,
            graph,
            visited,
            emails_by_page,
            interrupted,
        })
    }
}

// Marks a page in-progress and spawns its worker. The permit is acquired
// inside the task so dispatch itself never blocks the control loop.
fn dispatch(
    fetcher: &Arc<dyn Fetcher>,
    semaphore: &Arc<Semaphore>,
    tx: &mpsc::UnboundedSender<(String, PageOutcome)>,
    in_progress: &mut HashSet<String>,
    url: String,
) {
    debug!("dispatching worker for {}", url);
    in_progress.insert(url.clone());
    let fetcher = Arc::clone(fetcher);
    let semaphore = Arc::clone(semaphore);
    let tx = tx.clone();
    tokio::spawn(async move {
        let Ok(_permit) = semaphore.acquire_owned().await else {
            // Semaphore closed: the crawl is gone, nobody wants the result
            return;
        };
        let outcome = search_page(fetcher.as_ref(), &url).await;
        // A send failure just means the crawl already ended
        let _ = tx.send((url, outcome));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::fetch::{FetchError, FetchedPage};

    const ROOT: &str = "http://site.test/";

    /// In-memory stand-in for a website. Also records whether any URL was
    /// ever fetched by two workers at the same time.
    struct FakeFetcher {
        pages: HashMap<String, FetchedPage>,
        delay: Duration,
        in_flight: Mutex<HashSet<String>>,
        double_dispatch: AtomicBool,
    }

    impl FakeFetcher {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                delay: Duration::from_millis(1),
                in_flight: Mutex::new(HashSet::new()),
                double_dispatch: AtomicBool::new(false),
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                FetchedPage {
                    status: 200,
                    content_type: Some("text/html".to_string()),
                    body: body.as_bytes().to_vec(),
                },
            );
            self
        }

        fn asset(mut self, url: &str, content_type: &str) -> Self {
            self.pages.insert(
                url.to_string(),
                FetchedPage {
                    status: 200,
                    content_type: Some(content_type.to_string()),
                    body: vec![0, 1, 2, 3],
                },
            );
            self
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
            {
                let mut in_flight = self.in_flight.lock().unwrap();
                if !in_flight.insert(url.to_string()) {
                    self.double_dispatch.store(true, Ordering::SeqCst);
                }
            }
            tokio::time::sleep(self.delay).await;
            let result = self
                .pages
                .get(url)
                .cloned()
                .ok_or(FetchError::Status(404));
            self.in_flight.lock().unwrap().remove(url);
            result
        }

        async fn fetch_head(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.pages
                .get(url)
                .cloned()
                .map(|mut page| {
                    page.body.clear();
                    page
                })
                .ok_or(FetchError::Status(404))
        }
    }

    fn links_page(urls: &[String]) -> String {
        let anchors: String = urls
            .iter()
            .map(|url| format!("<a href=\"{}\">link</a>", url))
            .collect();
        format!("<html><body>{}</body></html>", anchors)
    }

    // A root page linking to `count` same-domain children.
    fn star_site(count: usize) -> (FakeFetcher, Vec<String>) {
        let children: Vec<String> = (0..count)
            .map(|i| format!("http://site.test/p{}", i))
            .collect();
        let mut fetcher = FakeFetcher::new().page(ROOT, &links_page(&children));
        for (i, child) in children.iter().enumerate() {
            let body = format!("<html><body>reach me at person{}@site.test</body></html>", i);
            fetcher = fetcher.page(child, &body);
        }
        (fetcher, children)
    }

    fn options(max_depth: usize) -> CrawlOptions {
        CrawlOptions {
            max_workers: 4,
            max_depth,
            within_domain: true,
        }
    }

    async fn run_crawl(fetcher: FakeFetcher, opts: CrawlOptions) -> CrawlResult {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        Crawler::new(Arc::new(fetcher))
            .crawl(ROOT, &opts, FilterChain::new(), cancel_rx)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_depth_one_visits_root_and_all_children() {
        let (fetcher, children) = star_site(10);
        let result = run_crawl(fetcher, options(1)).await;

        assert_eq!(result.visited.len(), 11);
        assert!(result.visited.contains(ROOT));
        for child in &children {
            assert!(result.visited.contains(child), "missing {}", child);
        }
        assert_eq!(result.emails().len(), 10);
    }

    #[tokio::test]
    async fn test_depth_zero_visits_only_the_root() {
        let (fetcher, _) = star_site(10);
        let result = run_crawl(fetcher, options(0)).await;

        assert_eq!(result.visited.len(), 1);
        assert!(result.visited.contains(ROOT));
    }

    #[tokio::test]
    async fn test_depth_bound_stops_link_expansion() {
        // root -> a -> b -> c: with max_depth 2, c is discovered in the
        // graph but never visited
        let fetcher = FakeFetcher::new()
            .page(ROOT, r#"<a href="/a">a</a>"#)
            .page("http://site.test/a", r#"<a href="/b">b</a>"#)
            .page("http://site.test/b", r#"<a href="/c">c</a>"#)
            .page("http://site.test/c", "never fetched");
        let result = run_crawl(fetcher, options(2)).await;

        assert_eq!(result.visited.len(), 3);
        assert!(!result.visited.contains("http://site.test/c"));
        assert!(result.graph.contains("http://site.test/c"));
    }

    #[tokio::test]
    async fn test_within_domain_never_visits_foreign_hosts() {
        let fetcher = FakeFetcher::new()
            .page(
                ROOT,
                r#"<a href="http://other.test/x">offsite</a><a href="/local">local</a>"#,
            )
            .page("http://site.test/local", "local page")
            .page("http://other.test/x", "offsite page");
        let result = run_crawl(fetcher, options(3)).await;

        assert!(result.visited.contains("http://site.test/local"));
        assert!(!result.visited.contains("http://other.test/x"));
        // Discovered, recorded in the graph, just never fetched
        assert!(result.graph.contains("http://other.test/x"));
    }

    #[tokio::test]
    async fn test_all_domains_follows_foreign_hosts() {
        let fetcher = FakeFetcher::new()
            .page(ROOT, r#"<a href="http://other.test/x">offsite</a>"#)
            .page("http://other.test/x", "offsite page");
        let mut opts = options(1);
        opts.within_domain = false;
        let result = run_crawl(fetcher, opts).await;

        assert!(result.visited.contains("http://other.test/x"));
    }

    #[tokio::test]
    async fn test_failed_fetch_still_counts_as_visited() {
        // /missing is linked but the fetcher has no such page (404)
        let fetcher = FakeFetcher::new().page(ROOT, r#"<a href="/missing">gone</a>"#);
        let result = run_crawl(fetcher, options(1)).await;

        assert!(result.visited.contains("http://site.test/missing"));
        assert!(result
            .emails_by_page
            .get("http://site.test/missing")
            .map(|emails| emails.is_empty())
            .unwrap_or(true));
    }

    #[tokio::test]
    async fn test_non_text_pages_are_visited_but_not_searched() {
        let fetcher = FakeFetcher::new()
            .page(ROOT, r#"<a href="/logo.png">logo</a>"#)
            .asset("http://site.test/logo.png", "image/png");
        let result = run_crawl(fetcher, options(2)).await;

        assert!(result.visited.contains("http://site.test/logo.png"));
        assert!(result.emails().is_empty());
        // The HEAD pre-check was enough to mark it loaded
        let page = result.graph.get_page("http://site.test/logo.png").unwrap();
        assert!(page.is_loaded());
    }

    #[tokio::test]
    async fn test_filter_chain_blocks_admission() {
        let fetcher = FakeFetcher::new()
            .page(ROOT, r#"<a href="/style.css">css</a><a href="/page">page</a>"#)
            .page("http://site.test/page", "a page")
            .asset("http://site.test/style.css", "text/css");
        let mut chain = FilterChain::new();
        chain.add(filters::extension_blacklist(vec!["css".to_string()]));

        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let result = Crawler::new(Arc::new(fetcher))
            .crawl(ROOT, &options(1), chain, cancel_rx)
            .await
            .unwrap();

        assert!(result.visited.contains("http://site.test/page"));
        assert!(!result.visited.contains("http://site.test/style.css"));
    }

    #[tokio::test]
    async fn test_interrupt_returns_partial_results() {
        let (fetcher, _) = star_site(10);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        // Fire the interrupt before the first page even completes: the root
        // is already in flight and must still be drained and reported
        cancel_tx.send(true).unwrap();

        let result = Crawler::new(Arc::new(fetcher))
            .crawl(ROOT, &options(3), FilterChain::new(), cancel_rx)
            .await
            .unwrap();

        assert!(result.interrupted);
        assert_eq!(result.visited.len(), 1);
        assert!(result.visited.contains(ROOT));
        // The root's links were still merged into the graph
        assert!(result.graph.len() > 1);
    }

    #[tokio::test]
    async fn test_no_page_is_dispatched_to_two_workers() {
        // Dense mesh: every page links to every other page, so the same
        // URLs are rediscovered on every cycle
        let pages: Vec<String> = (0..15)
            .map(|i| format!("http://site.test/mesh{}", i))
            .collect();
        let mut fetcher =
            FakeFetcher::new().with_delay(Duration::from_millis(5)).page(ROOT, &links_page(&pages));
        for page in &pages {
            fetcher = fetcher.page(page, &links_page(&pages));
        }

        let mut opts = options(4);
        opts.max_workers = 8;
        let fetcher = Arc::new(fetcher);
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let result = Crawler::new(fetcher.clone())
            .crawl(ROOT, &opts, FilterChain::new(), cancel_rx)
            .await
            .unwrap();

        assert_eq!(result.visited.len(), 16);
        assert!(
            !fetcher.double_dispatch.load(Ordering::SeqCst),
            "a page was fetched by two workers at once"
        );
    }
}
