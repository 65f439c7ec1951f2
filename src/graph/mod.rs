// src/graph/mod.rs
// =============================================================================
// The site graph: which page links to which.
//
// Submodules:
// - page: the Page type - canonical identity for one normalized URL, plus
//         its fetched state once a worker has loaded it
// - site: the SiteGraph - a symmetric adjacency structure over pages with
//         BFS-based neighbourhood and shortest-path queries
//
// The orchestrator grows this graph while it crawls and polls it every
// cycle to discover newly-connected candidates, so queries must always
// reflect the edges added so far.
// =============================================================================

mod page;
mod site;

pub use page::{NotLoadedError, Page};
pub use site::SiteGraph;
