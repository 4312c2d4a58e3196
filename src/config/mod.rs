//! Configuration module for Webharvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Command-line flags are layered on top of the loaded values by the binary.
//!
//! # Example
//!
//! ```no_run
//! use webharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FetcherConfig, OutputConfig, DEFAULT_DOCUMENT_EXTENSIONS};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
