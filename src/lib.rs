//! Webharvest: a depth-bounded site and document harvester
//!
//! This crate crawls a set of seed URLs to a bounded depth, classifies every
//! fetched resource as an HTML page or a downloadable document, extracts text
//! and metadata from documents (PDF, Word, spreadsheets, presentations, RTF,
//! plain text, HTML) and hands every discovered page, document and link to a
//! record pipeline that validates, deduplicates, enriches and persists it.

pub mod classify;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod pipeline;
pub mod records;
pub mod robots;
pub mod sink;
pub mod stats;
pub mod url;

use thiserror::Error;

/// Main error type for Webharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No seed URLs given")]
    NoSeeds,
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Webharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use classify::{Classification, DocumentClassifier, DocumentKind};
pub use config::Config;
pub use crawler::{CrawlEngine, Fetcher, HttpFetcher};
pub use pipeline::Pipeline;
pub use records::{DocumentRecord, FetchedResource, LinkRef, LinkType, PageRecord, Record};
pub use url::normalize_url;
