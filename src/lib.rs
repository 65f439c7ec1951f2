// src/lib.rs
// =============================================================================
// mail-hunter: crawl a website hunting for email addresses.
//
// The library is organized around one data flow:
//
//   crawl::Crawler -> fetch::Fetcher -> extract -> filters -> graph::SiteGraph
//
// The orchestrator in `crawl` drives everything; `fetch` is the only module
// that touches the network; `extract`, `filters`, `urls` and `graph` are
// pure. The binary in main.rs wires these together behind the CLI.
// =============================================================================

pub mod cli;     // command-line parsing
pub mod crawl;   // the crawl orchestrator
pub mod extract; // url/email extraction from page bodies
pub mod fetch;   // the Fetcher trait and the reqwest client
pub mod filters; // the filter chain over candidate urls
pub mod graph;   // pages and the site graph
pub mod report;  // stdout/JSON/CSV output
pub mod urls;    // url normalization
