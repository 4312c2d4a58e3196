use serde::Deserialize;

/// Extensions treated as downloadable documents when no config overrides them
pub const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp",
];

/// Main configuration structure for Webharvest
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a usable configuration once seeds are supplied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Depth at which fetched resources are dropped; seeds are depth 0
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Seed URLs to start crawling from
    pub seeds: Vec<String>,

    /// Domains follow-up fetches are restricted to (empty means no restriction)
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// URL extensions classified as documents
    #[serde(rename = "document-extensions")]
    pub document_extensions: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            seeds: Vec::new(),
            allowed_domains: Vec::new(),
            document_extensions: DEFAULT_DOCUMENT_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Maximum number of requests in flight
    #[serde(rename = "concurrent-requests")]
    pub concurrent_requests: u32,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "download-delay-ms")]
    pub download_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Retries for timeouts, connection failures and retryable statuses
    #[serde(rename = "retry-times")]
    pub retry_times: u32,

    /// Whether robots.txt rules are honoured
    #[serde(rename = "obey-robots")]
    pub obey_robots: bool,

    /// Largest response body accepted (bytes)
    #[serde(rename = "max-file-size")]
    pub max_file_size: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: 8,
            download_delay_ms: 1000,
            timeout_secs: 30,
            retry_times: 3,
            obey_robots: true,
            max_file_size: 50 * 1024 * 1024,
            user_agent: concat!("webharvest/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving `pages/`, `documents/` and `links/` record folders
    pub directory: String,

    /// Optional SQLite database receiving a copy of every record
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "data".to_string(),
            database_path: None,
        }
    }
}
