//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic and robots.txt checks
//! - Per-host request spacing
//! - HTML parsing and link extraction
//! - The visited-URL frontier
//! - Overall crawl coordination

mod engine;
mod fetcher;
mod frontier;
mod parser;
mod throttle;

pub use engine::{CrawlEngine, DEFAULT_MAX_DEPTH};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use frontier::{FetchRequest, Frontier};
pub use parser::{parse_html, resolve_link, Anchor, ParsedPage};
pub use throttle::HostThrottle;

use crate::classify::DocumentClassifier;
use crate::config::Config;
use crate::pipeline::Pipeline;
use crate::sink::{FanoutSink, JsonSink, Sink, SqliteSink};
use crate::stats::{CrawlReport, CrawlStats};
use crate::url::normalize_url;
use crate::HarvestError;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Normalize the seed URLs
/// 2. Open the JSON output directory (and the SQLite database, if set)
/// 3. Build the HTTP fetcher and the standard record pipeline
/// 4. Crawl until no fetch is pending
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(HarvestError)` - Setup failed (no seeds, invalid seed URL,
///   output not creatable, HTTP client not buildable)
pub async fn crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    if config.crawler.seeds.is_empty() {
        return Err(HarvestError::NoSeeds);
    }

    let seeds = config
        .crawler
        .seeds
        .iter()
        .map(|seed| normalize_url(seed))
        .collect::<Result<Vec<_>, _>>()?;

    let sink = open_sinks(&config)?;
    let stats = Arc::new(CrawlStats::new());
    let pipeline = Pipeline::standard(sink, stats);
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);

    let engine = CrawlEngine::new(fetcher, pipeline)
        .with_max_depth(config.crawler.max_depth)
        .with_allowed_domains(config.crawler.allowed_domains.clone())
        .with_classifier(DocumentClassifier::new(&config.crawler.document_extensions));

    Ok(engine.start(&seeds).await)
}

fn open_sinks(config: &Config) -> Result<Arc<dyn Sink>, HarvestError> {
    let json = JsonSink::new(&config.output.directory)?;
    info!("Writing records to {}", json.root().display());

    let mut sinks = FanoutSink::new().with(Arc::new(json));
    if let Some(path) = &config.output.database_path {
        info!("Writing records to database {}", path);
        sinks = sinks.with(Arc::new(SqliteSink::new(Path::new(path))?));
    }

    Ok(Arc::new(sinks))
}
