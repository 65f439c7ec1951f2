// src/filters.rs
// =============================================================================
// The filter chain: an ordered list of predicates over candidate URLs.
//
// A candidate survives only if *every* predicate accepts it, evaluated in
// registration order with short-circuiting on the first rejection.
//
// Built-in predicates:
// - within_domain: candidate netloc equals the root page's netloc
// - extension_blacklist: skip asset-ish paths (.png, .css, ...)
// - allow_matching / deny_matching: regex allow- and deny-lists
//
// "Not already seen" is deliberately NOT a predicate here: it depends on
// the orchestrator's visited and in-progress sets, and is checked by the
// orchestrator itself at admission time against the current snapshot.
//
// Each crawl run builds its own FilterChain - there is no process-wide
// filter state to leak between runs.
// =============================================================================

use regex::Regex;
use url::Url;

use crate::urls::netloc;

/// A single yes/no decision about a candidate URL.
pub type UrlPredicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Default)]
pub struct FilterChain {
    predicates: Vec<UrlPredicate>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a predicate; evaluation happens in registration order.
    pub fn add(&mut self, predicate: UrlPredicate) {
        self.predicates.push(predicate);
    }

    /// Logical AND over all predicates. `all` short-circuits on the first
    /// rejection, so later predicates never see rejected candidates.
    pub fn accepts(&self, url: &str) -> bool {
        self.predicates.iter().all(|predicate| predicate(url))
    }
}

/// Accepts only URLs whose network location matches the root's.
pub fn within_domain(root_url: &str) -> UrlPredicate {
    let root_netloc = netloc(root_url);
    Box::new(move |candidate| match (&root_netloc, netloc(candidate)) {
        (Some(root), Some(candidate)) => *root == candidate,
        // Either side has no host - never within the domain
        _ => false,
    })
}

/// Rejects URLs whose path ends with one of the given extensions.
///
/// Extensions are given without the dot ("png", not ".png").
pub fn extension_blacklist(extensions: Vec<String>) -> UrlPredicate {
    Box::new(move |candidate| {
        let path = match Url::parse(candidate) {
            Ok(parsed) => parsed.path().to_lowercase(),
            // Unparseable candidates are somebody else's problem
            Err(_) => return true,
        };
        extensions
            .iter()
            .all(|ext| !path.ends_with(&format!(".{}", ext.to_lowercase())))
    })
}

/// Accepts only URLs matching the pattern.
pub fn allow_matching(pattern: Regex) -> UrlPredicate {
    Box::new(move |candidate| pattern.is_match(candidate))
}

/// Rejects URLs matching the pattern.
pub fn deny_matching(pattern: Regex) -> UrlPredicate {
    Box::new(move |candidate| !pattern.is_match(candidate))
}
