//! Per-origin robots.txt cache
//!
//! Each origin's robots.txt is fetched at most once per run. Concurrent
//! requests for the same origin wait on a shared `OnceCell` instead of
//! racing to download it.

use crate::robots::RobotsRules;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use url::Url;

/// Lazily populated robots.txt rules keyed by origin
#[derive(Debug, Default)]
pub struct RobotsCache {
    entries: DashMap<String, Arc<OnceCell<RobotsRules>>>,
}

impl RobotsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the rules for the URL's origin, fetching robots.txt on first use
    ///
    /// A 200 response is parsed. Any other status, or a transport error,
    /// yields allow-all rules.
    pub async fn rules_for(&self, client: &reqwest::Client, url: &Url) -> RobotsRules {
        let origin = url.origin().ascii_serialization();
        let cell = self
            .entries
            .entry(origin.clone())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        cell.get_or_init(|| fetch_rules(client, origin))
            .await
            .clone()
    }

    /// Number of origins seen so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

async fn fetch_rules(client: &reqwest::Client, origin: String) -> RobotsRules {
    let robots_url = format!("{}/robots.txt", origin);

    let response = match client.get(&robots_url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to fetch {}: {}; allowing all", robots_url, e);
            return RobotsRules::allow_all();
        }
    };

    if response.status() != reqwest::StatusCode::OK {
        debug!(
            "{} returned {}; allowing all",
            robots_url,
            response.status()
        );
        return RobotsRules::allow_all();
    }

    match response.text().await {
        Ok(body) => RobotsRules::from_content(&body),
        Err(e) => {
            warn!("Failed to read {}: {}; allowing all", robots_url, e);
            RobotsRules::allow_all()
        }
    }
}
