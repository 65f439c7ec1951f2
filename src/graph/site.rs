// src/graph/site.rs
// =============================================================================
// SiteGraph: the undirected page-relationship graph the crawl builds.
//
// Two structures, kept in lockstep:
// - pages: normalized URL -> the canonical Page instance
// - adjacency: normalized URL -> set of neighbouring URLs
//
// Invariants:
// - every key of `pages` is a key of `adjacency` and vice versa
// - adjacency is symmetric: b is in a's set iff a is in b's set
// - the graph only grows; there is no page or edge removal
//
// Queries:
// - find_nearest_neighbours: every page within N hops of a root (this is
//   what the orchestrator polls each cycle, so it must see edges added
//   since the last call)
// - find_path: shortest path by hop count (BFS, uniform edge weight)
// =============================================================================

use std::collections::{HashMap, HashSet, VecDeque};

use crate::fetch::FetchedPage;

use super::Page;

#[derive(Debug, Default)]
pub struct SiteGraph {
    pages: HashMap<String, Page>,
    adjacency: HashMap<String, HashSet<String>>,
}

impl SiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages (discovered, not necessarily visited) in the graph.
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    pub fn get_page(&self, url: &str) -> Option<&Page> {
        self.pages.get(url)
    }

    /// Iterates over every canonical page in the graph.
    pub fn pages(&self) -> impl Iterator<Item = &Page> {
        self.pages.values()
    }

    // Inserts the page and its adjacency entry if this URL is new.
    // This is the only place pages are created, which is what makes the
    // instance in `pages` canonical.
    fn ensure_page(&mut self, url: &str) {
        if !self.pages.contains_key(url) {
            self.pages.insert(url.to_string(), Page::new(url));
            self.adjacency.insert(url.to_string(), HashSet::new());
        }
    }

    /// Registers a page (returning the existing canonical instance when the
    /// URL is already known) and, when a parent is given, links the two.
    pub fn add_page(&mut self, url: &str, parent: Option<&str>) -> &Page {
        self.ensure_page(url);
        if let Some(parent) = parent {
            self.add_relation(parent, url);
        }
        // Just inserted above, so indexing cannot miss
        &self.pages[url]
    }

    /// Inserts a symmetric edge, registering both endpoints if needed.
    pub fn add_relation(&mut self, a: &str, b: &str) {
        self.ensure_page(a);
        self.ensure_page(b);
        if a == b {
            // Self-references add nothing to reachability
            return;
        }
        // Entries exist after ensure_page, so the lookups cannot miss
        if let Some(set) = self.adjacency.get_mut(a) {
            set.insert(b.to_string());
        }
        if let Some(set) = self.adjacency.get_mut(b) {
            set.insert(a.to_string());
        }
    }

    /// Records fetched state on the canonical page for this URL.
    pub fn mark_loaded(&mut self, url: &str, fetched: FetchedPage) {
        self.ensure_page(url);
        if let Some(page) = self.pages.get_mut(url) {
            page.load(fetched);
        }
    }

    /// Returns every page whose shortest-path distance from `root` is at
    /// most `max_distance` (including the root itself). Unknown roots give
    /// an empty result.
    pub fn find_nearest_neighbours(&self, root: &str, max_distance: usize) -> Vec<&Page> {
        if !self.pages.contains_key(root) {
            return Vec::new();
        }

        let mut distance: HashMap<&str, usize> = HashMap::new();
        distance.insert(root, 0);
        let mut queue: VecDeque<&str> = VecDeque::from([root]);

        while let Some(current) = queue.pop_front() {
            let next = distance[current] + 1;
            if next > max_distance {
                continue;
            }
            if let Some(neighbours) = self.adjacency.get(current) {
                for neighbour in neighbours {
                    if !distance.contains_key(neighbour.as_str()) {
                        distance.insert(neighbour.as_str(), next);
                        queue.push_back(neighbour.as_str());
                    }
                }
            }
        }

        distance.keys().map(|url| &self.pages[*url]).collect()
    }

    /// Shortest path between two pages by hop count, or None when either
    /// endpoint is unknown or the pages live in disjoint components.
    ///
    /// Any valid shortest path is acceptable; tie-breaking between
    /// equal-length paths follows hash-map iteration order.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<&Page>> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }

        // Trivial cases, no traversal needed
        if from == to {
            return Some(vec![&self.pages[from]]);
        }
        if self.adjacency[from].contains(to) {
            return Some(vec![&self.pages[from], &self.pages[to]]);
        }

        // BFS with uniform weights. Unreached pages sit at len() + 1, one
        // more than any real path can be, so they never look closer than a
        // genuinely reached page.
        let unreached = self.pages.len() + 1;
        let mut distance: HashMap<&str, usize> =
            self.pages.keys().map(|url| (url.as_str(), unreached)).collect();
        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut queue: VecDeque<&str> = VecDeque::from([from]);
        distance.insert(from, 0);

        while let Some(current) = queue.pop_front() {
            if current == to {
                break;
            }
            let next = distance[current] + 1;
            for neighbour in &self.adjacency[current] {
                if next < distance[neighbour.as_str()] {
                    distance.insert(neighbour.as_str(), next);
                    previous.insert(neighbour.as_str(), current);
                    queue.push_back(neighbour.as_str());
                }
            }
        }

        if distance[to] == unreached {
            return None;
        }

        // Walk the predecessor chain back from the target
        let mut hops = vec![to];
        let mut current = to;
        while let Some(&prior) = previous.get(current) {
            hops.push(prior);
            current = prior;
        }
        hops.reverse();
        Some(hops.into_iter().map(|url| &self.pages[url]).collect())
    }

    /// Flattens the graph into (from, to) pairs for export, each undirected
    /// edge exactly once, sorted for stable output.
    pub fn save_edges(&self) -> Vec<(String, String)> {
        let mut edges = Vec::new();
        for (from, neighbours) in &self.adjacency {
            for to in neighbours {
                if from <= to {
                    edges.push((from.clone(), to.clone()));
                }
            }
        }
        edges.sort();
        edges
    }
}
