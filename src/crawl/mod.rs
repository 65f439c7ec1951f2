// src/crawl/mod.rs
// =============================================================================
// The crawl orchestrator - the heart of the tool.
//
// Submodules:
// - engine: the single-threaded control loop that owns the frontier, the
//           visited set and the site graph, plus the bounded worker pool
// - worker: the fetch+extract job one worker runs for one page
//
// Why this split?
// - everything that mutates shared crawl state lives in one loop, so the
//   graph and the frontier never need locks
// - workers are pure producers: fetch a page, extract from it, send the
//   outcome over a channel, done
// =============================================================================

mod engine;
mod worker;

pub use engine::{CrawlError, CrawlOptions, CrawlResult, Crawler};
