//! Crawl counters
//!
//! Every crawl task and pipeline stage reports into one shared
//! [`CrawlStats`]. A [`CrawlReport`] snapshot is taken when the crawl ends.

mod report;

pub use report::{print_report, CrawlReport};

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Live counters for a running crawl
#[derive(Debug, Default)]
pub struct CrawlStats {
    fetches: AtomicU64,
    fetch_failures: AtomicU64,
    depth_limited: AtomicU64,
    pages: AtomicU64,
    documents: AtomicU64,
    links: AtomicU64,
    persisted: AtomicU64,
    extraction_failures: AtomicU64,
    dropped: Mutex<BTreeMap<&'static str, u64>>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_fetch(&self) {
        self.fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A fetched resource discarded because it sat at the depth limit
    pub fn record_depth_limited(&self) {
        self.depth_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_page(&self) {
        self.pages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_document(&self) {
        self.documents.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_link(&self) {
        self.links.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persisted(&self) {
        self.persisted.fetch_add(1, Ordering::Relaxed);
    }

    /// A document for which every extraction method failed
    pub fn record_extraction_failure(&self) {
        self.extraction_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A record dropped by the named pipeline stage
    pub fn record_drop(&self, stage: &'static str) {
        let mut dropped = match self.dropped.lock() {
            Ok(dropped) => dropped,
            Err(poisoned) => poisoned.into_inner(),
        };
        *dropped.entry(stage).or_insert(0) += 1;
    }

    /// Takes a snapshot of the counters
    ///
    /// # Arguments
    ///
    /// * `elapsed` - Wall-clock duration of the crawl
    pub fn report(&self, elapsed: Duration) -> CrawlReport {
        let dropped = match self.dropped.lock() {
            Ok(dropped) => dropped.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };

        CrawlReport {
            fetches: self.fetches.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            depth_limited: self.depth_limited.load(Ordering::Relaxed),
            pages: self.pages.load(Ordering::Relaxed),
            documents: self.documents.load(Ordering::Relaxed),
            links: self.links.load(Ordering::Relaxed),
            persisted: self.persisted.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
            dropped: dropped
                .into_iter()
                .map(|(stage, count)| (stage.to_string(), count))
                .collect(),
            elapsed,
        }
    }
}
