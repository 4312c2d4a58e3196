//! URL handling module for Webharvest
//!
//! This module provides URL normalization, domain and network-location
//! extraction, path helpers and allowed-domain matching.

mod domain;
mod matcher;
mod normalize;
mod path;

// Re-export main functions
pub use domain::{extract_domain, network_location};
pub use matcher::matches_allowed_domain;
pub use normalize::{normalize_parsed, normalize_url};
pub use path::{file_extension, file_name};

use url::Url;

/// Checks a URL against the configured allowed-domain list
///
/// An empty list allows every URL. Entries carrying a port are compared
/// against the URL's network location, all others against its host.
///
/// # Arguments
///
/// * `url` - The candidate URL
/// * `allowed` - Allowed-domain entries from the configuration
///
/// # Returns
///
/// `true` if the URL may be fetched
pub fn is_allowed_domain(url: &Url, allowed: &[String]) -> bool {
    if allowed.is_empty() {
        return true;
    }

    let host = match extract_domain(url) {
        Some(host) => host,
        None => return false,
    };
    let netloc = network_location(url).unwrap_or_else(|| host.clone());

    allowed.iter().any(|pattern| {
        let pattern = pattern.to_lowercase();
        if pattern.contains(':') {
            matches_allowed_domain(&pattern, &netloc)
        } else {
            matches_allowed_domain(&pattern, &host)
        }
    })
}
