//! Visited-URL set shared by all crawl tasks

use dashmap::DashSet;
use url::Url;

/// A URL waiting to be fetched and the depth it was discovered at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: Url,
    /// Seeds are depth 0, their links depth 1, and so on
    pub depth: u32,
}

impl FetchRequest {
    pub fn seed(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// A request for a link found on this request's page
    pub fn child(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }
}

/// Tracks every URL that has been scheduled
///
/// Checking and inserting happen in one step, so when several pages link to
/// the same URL concurrently exactly one of them gets to schedule it.
#[derive(Debug, Default)]
pub struct Frontier {
    visited: DashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL visited, returning true if it was not visited before
    pub fn claim(&self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Number of URLs claimed so far
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
