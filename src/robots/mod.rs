//! Robots.txt handling module
//!
//! This module provides fetching, parsing and per-origin caching of
//! robots.txt files. It is used by the HTTP fetcher when robots obedience
//! is enabled.

mod cache;
mod parser;

pub use cache::RobotsCache;
pub use parser::{RobotsRules, MAX_CRAWL_DELAY};

/// Returns the product token of a user agent string
///
/// Robots.txt groups name products (`webharvest`), not full agent strings
/// (`webharvest/0.1 (+https://...)`).
///
/// # Examples
///
/// ```
/// use webharvest::robots::product_token;
///
/// assert_eq!(product_token("webharvest/0.1.0 (+https://a.test)"), "webharvest");
/// ```
pub fn product_token(user_agent: &str) -> &str {
    user_agent
        .split(|c: char| c == '/' || c.is_whitespace())
        .find(|part| !part.is_empty())
        .unwrap_or(user_agent)
}
