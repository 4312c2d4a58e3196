//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and timeout
//! - Robots.txt checks and crawl-delay
//! - Per-host request spacing and a global concurrency limit
//! - Retry logic for transient failures
//! - Response size limits

use crate::config::FetcherConfig;
use crate::crawler::throttle::HostThrottle;
use crate::records::FetchedResource;
use crate::robots::{product_token, RobotsCache};
use crate::url::network_location;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

/// Status codes that are retried before the response is handed back
const RETRY_STATUS_CODES: &[u16] = &[408, 429, 500, 502, 503, 504];

/// Maximum redirect hops followed by the client
const MAX_REDIRECTS: usize = 10;

/// Errors that prevent a fetch from producing a response
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} is disallowed by robots.txt")]
    RobotsDenied { url: String },

    #[error("{url} is {size} bytes, over the {limit} byte limit")]
    TooLarge { url: String, size: u64, limit: u64 },

    #[error("Fetcher is shutting down")]
    Closed,
}

impl FetchError {
    /// Whether retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { source, .. } => source.is_connect() || source.is_request(),
            _ => false,
        }
    }

    fn from_reqwest(url: &Url, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source,
            }
        }
    }
}

/// Source of fetched resources for the crawl engine
///
/// The engine only depends on this trait, so tests can crawl a fixed set of
/// in-memory responses.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a URL, following redirects
    ///
    /// Any HTTP status counts as a response; only transport failures,
    /// robots denials and oversized bodies are errors.
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use webharvest::config::FetcherConfig;
/// use webharvest::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by reqwest
///
/// # Request Flow
///
/// 1. Take a concurrency permit
/// 2. Check robots.txt for the URL's origin (when enabled)
/// 3. Wait for the host's next slot (download delay or crawl-delay)
/// 4. Send GET, following up to 10 redirects
/// 5. Retry retryable statuses and transient errors up to `retry_times`
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 408, 429, 500, 502, 503, 504 | Retry, then return last response |
/// | Timeout, connect error | Retry, then error |
/// | Body over `max_file_size` | Error, no retry |
/// | Disallowed by robots.txt | Error, no request sent |
pub struct HttpFetcher {
    client: Client,
    permits: Semaphore,
    throttle: HostThrottle,
    robots: Option<RobotsCache>,
    agent: String,
    retry_times: u32,
    max_file_size: u64,
}

impl HttpFetcher {
    /// Creates a fetcher from the configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            permits: Semaphore::new(config.concurrent_requests.max(1) as usize),
            throttle: HostThrottle::new(Duration::from_millis(config.download_delay_ms)),
            robots: config.obey_robots.then(RobotsCache::new),
            agent: product_token(&config.user_agent).to_string(),
            retry_times: config.retry_times,
            max_file_size: config.max_file_size,
        })
    }

    async fn fetch_once(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        if let Some(size) = response.content_length() {
            if size > self.max_file_size {
                return Err(self.too_large(url, size));
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        // Content-Length may be absent or wrong; count while streaming
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?
        {
            let size = (body.len() + chunk.len()) as u64;
            if size > self.max_file_size {
                return Err(self.too_large(url, size));
            }
            body.extend_from_slice(&chunk);
        }

        let mut resource = FetchedResource {
            url: final_url,
            status,
            headers,
            body,
            content_type: String::new(),
        };
        resource.content_type = resource
            .header("content-type")
            .unwrap_or_default()
            .to_string();
        Ok(resource)
    }

    fn too_large(&self, url: &Url, size: u64) -> FetchError {
        FetchError::TooLarge {
            url: url.to_string(),
            size,
            limit: self.max_file_size,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        let _permit = self.permits.acquire().await.map_err(|_| FetchError::Closed)?;

        let mut crawl_delay = None;
        if let Some(robots) = &self.robots {
            let rules = robots.rules_for(&self.client, url).await;
            if !rules.is_allowed(url.as_str(), &self.agent) {
                return Err(FetchError::RobotsDenied {
                    url: url.to_string(),
                });
            }
            crawl_delay = rules.crawl_delay(&self.agent);
        }

        let host = network_location(url).unwrap_or_default();
        let mut attempt = 0;

        loop {
            self.throttle.wait(&host, crawl_delay).await;
            debug!("GET {} (attempt {})", url, attempt + 1);

            match self.fetch_once(url).await {
                Ok(resource)
                    if RETRY_STATUS_CODES.contains(&resource.status)
                        && attempt < self.retry_times =>
                {
                    attempt += 1;
                    warn!(
                        "{} returned {}, retrying ({}/{})",
                        url, resource.status, attempt, self.retry_times
                    );
                }
                Ok(resource) => return Ok(resource),
                Err(e) if e.is_transient() && attempt < self.retry_times => {
                    attempt += 1;
                    warn!(
                        "{}; retrying ({}/{})",
                        e, attempt, self.retry_times
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}
