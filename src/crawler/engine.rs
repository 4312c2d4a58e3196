//! Crawl engine - depth-bounded traversal of the link graph
//!
//! This module contains the main crawl loop, which:
//! - Claims seeds in the frontier and fetches them at depth 0
//! - Classifies every fetched resource as a page or a document
//! - Emits page, document and link records into the pipeline
//! - Schedules follow-up fetches for internal links

use crate::classify::DocumentClassifier;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{FetchRequest, Frontier};
use crate::crawler::parser::parse_html;
use crate::pipeline::Pipeline;
use crate::records::{DocumentRecord, FetchedResource, LinkRef, LinkType, PageRecord, Record};
use crate::stats::{CrawlReport, CrawlStats};
use crate::url::{file_name, is_allowed_domain};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use url::Url;

/// Response headers copied into a document's metadata
const DOCUMENT_HEADERS: &[&str] = &["last-modified", "content-length", "content-type"];

/// Default depth at which fetched resources are dropped
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Drives a crawl from seeds to an empty frontier
///
/// Cloning is cheap; every crawl task holds its own clone.
#[derive(Clone)]
pub struct CrawlEngine {
    fetcher: Arc<dyn Fetcher>,
    classifier: Arc<DocumentClassifier>,
    frontier: Arc<Frontier>,
    pipeline: Arc<Pipeline>,
    stats: Arc<CrawlStats>,
    max_depth: u32,
    allowed_domains: Arc<Vec<String>>,
}

impl CrawlEngine {
    /// Creates an engine with the default classifier, depth 3 and no domain
    /// restriction
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Source of fetched resources
    /// * `pipeline` - Pipeline every emitted record runs through
    pub fn new(fetcher: Arc<dyn Fetcher>, pipeline: Pipeline) -> Self {
        let stats = Arc::clone(pipeline.stats());
        Self {
            fetcher,
            classifier: Arc::new(DocumentClassifier::default()),
            frontier: Arc::new(Frontier::new()),
            pipeline: Arc::new(pipeline),
            stats,
            max_depth: DEFAULT_MAX_DEPTH,
            allowed_domains: Arc::new(Vec::new()),
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Restricts follow-up fetches to these domain patterns
    pub fn with_allowed_domains(mut self, allowed_domains: Vec<String>) -> Self {
        self.allowed_domains = Arc::new(allowed_domains);
        self
    }

    pub fn with_classifier(mut self, classifier: DocumentClassifier) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn stats(&self) -> &Arc<CrawlStats> {
        &self.stats
    }

    /// Crawls from the seeds until no fetch is pending
    ///
    /// Duplicate seeds are fetched once. Tasks complete in arbitrary order;
    /// a panicking task is logged and the crawl continues.
    ///
    /// # Returns
    ///
    /// A snapshot of the crawl counters
    pub async fn start(&self, seeds: &[Url]) -> CrawlReport {
        let started = Instant::now();
        let mut tasks = JoinSet::new();

        for seed in seeds {
            let mut seed = seed.clone();
            seed.set_fragment(None);
            if !self.frontier.claim(&seed) {
                debug!("Skipping duplicate seed {}", seed);
                continue;
            }
            self.spawn(&mut tasks, FetchRequest::seed(seed));
        }

        info!("Crawling from {} seed(s), max depth {}", tasks.len(), self.max_depth);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(children) => {
                    for child in children {
                        self.spawn(&mut tasks, child);
                    }
                }
                Err(e) => error!("Crawl task failed: {}", e),
            }
        }

        let report = self.stats.report(started.elapsed());
        info!(
            "Crawl finished: {} fetches, {} records persisted in {:.1}s",
            report.fetches,
            report.persisted,
            report.elapsed.as_secs_f64()
        );
        report
    }

    fn spawn(&self, tasks: &mut JoinSet<Vec<FetchRequest>>, request: FetchRequest) {
        let engine = self.clone();
        tasks.spawn(async move { engine.process(request).await });
    }

    /// Fetches one request and handles the response
    ///
    /// # Returns
    ///
    /// Follow-up requests already claimed in the frontier
    pub async fn process(&self, request: FetchRequest) -> Vec<FetchRequest> {
        self.stats.record_fetch();
        debug!("Fetching {} (depth {})", request.url, request.depth);

        match self.fetcher.fetch(&request.url).await {
            Ok(resource) => self.handle(resource, &request).await,
            Err(e) => {
                self.stats.record_fetch_failure();
                warn!("Fetch failed for {}: {}", request.url, e);
                Vec::new()
            }
        }
    }

    /// Turns a fetched resource into records and follow-up requests
    pub async fn handle(&self, resource: FetchedResource, request: &FetchRequest) -> Vec<FetchRequest> {
        if request.depth >= self.max_depth {
            debug!(
                "Dropping {} at depth {} (max {})",
                resource.url, request.depth, self.max_depth
            );
            self.stats.record_depth_limited();
            return Vec::new();
        }

        if resource.body.is_empty() {
            debug!("Empty body from {} (status {})", resource.url, resource.status);
            return Vec::new();
        }

        // A redirect target counts as visited too
        self.frontier.claim(&resource.url);

        let classification = self
            .classifier
            .classify(&resource.url, &resource.content_type);

        if classification.is_document {
            let document = build_document(resource, classification.file_type);
            self.stats.record_document();
            self.emit(document.into()).await;
            Vec::new()
        } else {
            self.handle_page(resource, request).await
        }
    }

    async fn handle_page(&self, resource: FetchedResource, request: &FetchRequest) -> Vec<FetchRequest> {
        let page_url = resource.url;
        let html = String::from_utf8_lossy(&resource.body).into_owned();
        let parsed = parse_html(&html, &page_url);

        let mut links: Vec<LinkRef> = parsed
            .anchors
            .iter()
            .map(|anchor| LinkRef {
                source_url: page_url.to_string(),
                target_url: anchor.url.to_string(),
                link_text: anchor.text.clone(),
                link_type: self.classifier.classify_link(&anchor.url, &page_url),
                timestamp: None,
            })
            .collect();
        links.extend(parsed.resources.iter().map(|target| LinkRef {
            source_url: page_url.to_string(),
            target_url: target.to_string(),
            link_text: String::new(),
            link_type: LinkType::Resource,
            timestamp: None,
        }));

        let page = PageRecord {
            url: page_url.to_string(),
            title: parsed.title,
            raw_html: html,
            extracted_text: parsed.text,
            links: links.clone(),
            images: parsed.images,
            meta_description: parsed.meta_description,
            meta_keywords: parsed.meta_keywords,
            headers: parsed.headings,
            status: resource.status,
            content_type: resource.content_type,
            size: resource.body.len(),
            timestamp: Utc::now(),
        };

        self.stats.record_page();
        self.emit(page.into()).await;

        for link in &links {
            self.stats.record_link();
            self.emit(Record::Link(link.clone())).await;
        }

        let children: Vec<FetchRequest> = parsed
            .anchors
            .into_iter()
            .map(|anchor| anchor.url)
            .filter(|target| {
                self.classifier.classify_link(target, &page_url) == LinkType::Internal
            })
            .filter(|target| {
                let allowed = is_allowed_domain(target, &self.allowed_domains);
                if !allowed {
                    debug!("Not following {}: outside allowed domains", target);
                }
                allowed
            })
            .filter(|target| self.frontier.claim(target))
            .map(|target| request.child(target))
            .collect();

        debug!(
            "{}: {} links, {} new fetches",
            page_url,
            links.len(),
            children.len()
        );
        children
    }

    async fn emit(&self, record: Record) {
        // Drops are logged and counted by the pipeline
        let _ = self.pipeline.process(record).await;
    }
}

/// Builds a document record from a response; text is filled in later by
/// the enrich stage
fn build_document(resource: FetchedResource, file_type: String) -> DocumentRecord {
    let metadata: BTreeMap<String, String> = DOCUMENT_HEADERS
        .iter()
        .filter_map(|name| {
            resource
                .header(name)
                .map(|value| (name.to_string(), value.to_string()))
        })
        .collect();

    DocumentRecord {
        filename: file_name(&resource.url).unwrap_or_else(|| "unknown".to_string()),
        url: resource.url.to_string(),
        file_type,
        size: resource.body.len(),
        raw_bytes: resource.body,
        extracted_text: String::new(),
        metadata,
        timestamp: Utc::now(),
        page_count: None,
    }
}
