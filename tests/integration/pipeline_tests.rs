//! Integration tests for the record pipeline
//!
//! These tests drive the crawl engine with an in-memory fetcher and check
//! what reaches the sinks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use url::Url;
use webharvest::crawler::{CrawlEngine, FetchError, Fetcher};
use webharvest::pipeline::{Pipeline, EXTRACTION_ERROR_KEY};
use webharvest::records::{FetchedResource, Record, RecordCategory};
use webharvest::sink::{FanoutSink, JsonSink, MemorySink, Sink};
use webharvest::stats::CrawlStats;

/// A canned response, optionally served from a different final URL
struct Canned {
    final_url: String,
    content_type: String,
    body: Vec<u8>,
}

/// Fetcher serving canned responses and counting requests
#[derive(Default)]
struct CannedFetcher {
    responses: HashMap<String, Canned>,
    calls: Mutex<Vec<String>>,
}

impl CannedFetcher {
    fn html(self, url: &str, body: &str) -> Self {
        self.serve(url, url, "text/html", body.as_bytes())
    }

    fn redirect(self, url: &str, final_url: &str, body: &str) -> Self {
        self.serve(url, final_url, "text/html", body.as_bytes())
    }

    fn serve(mut self, url: &str, final_url: &str, content_type: &str, body: &[u8]) -> Self {
        self.responses.insert(
            url.to_string(),
            Canned {
                final_url: final_url.to_string(),
                content_type: content_type.to_string(),
                body: body.to_vec(),
            },
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for CannedFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedResource, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());

        match self.responses.get(url.as_str()) {
            Some(canned) => Ok(FetchedResource {
                url: Url::parse(&canned.final_url).unwrap(),
                status: 200,
                headers: vec![("content-type".to_string(), canned.content_type.clone())],
                body: canned.body.clone(),
                content_type: canned.content_type.clone(),
            }),
            None => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
        }
    }
}

fn run_engine(fetcher: Arc<CannedFetcher>, sink: Arc<dyn Sink>, max_depth: u32) -> CrawlEngine {
    let pipeline = Pipeline::standard(sink, Arc::new(CrawlStats::new()));
    CrawlEngine::new(fetcher, pipeline).with_max_depth(max_depth)
}

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[tokio::test]
async fn test_seed_scenario() {
    let fetcher = Arc::new(CannedFetcher::default().html(
        "https://a.test/",
        r#"<html><body>
            <a href="/b">B</a>
            <a href="https://x.test/">X</a>
            <a href="/report.pdf">Report</a>
        </body></html>"#,
    ).html("https://a.test/b", "<html><body>B</body></html>"));
    let sink = Arc::new(MemorySink::new());

    let engine = run_engine(Arc::clone(&fetcher), sink.clone(), 1);
    let report = engine.start(&[url("https://a.test/")]).await;

    assert_eq!(sink.by_category(RecordCategory::Page).len(), 1);
    assert_eq!(sink.by_category(RecordCategory::Link).len(), 3);
    assert_eq!(
        fetcher.calls(),
        vec!["https://a.test/".to_string(), "https://a.test/b".to_string()]
    );
    assert_eq!(report.depth_limited, 1);
}

#[tokio::test]
async fn test_redirects_to_same_page_deduplicated() {
    let fetcher = Arc::new(
        CannedFetcher::default()
            .html(
                "https://a.test/",
                r#"<a href="/old">old</a><a href="/older">older</a>"#,
            )
            .redirect("https://a.test/old", "https://a.test/new", "<p>new</p>")
            .redirect("https://a.test/older", "https://a.test/new", "<p>new</p>"),
    );
    let sink = Arc::new(MemorySink::new());
    let stats = Arc::new(CrawlStats::new());
    let pipeline = Pipeline::standard(sink.clone(), Arc::clone(&stats));
    let engine = CrawlEngine::new(fetcher, pipeline).with_max_depth(3);

    let report = engine.start(&[url("https://a.test/")]).await;

    let urls: Vec<String> = sink
        .by_category(RecordCategory::Page)
        .iter()
        .map(|record| record.url().to_string())
        .collect();
    assert_eq!(urls.len(), 2);
    assert!(urls.contains(&"https://a.test/new".to_string()));
    assert_eq!(report.dropped.get("deduplicate"), Some(&1));
}

#[tokio::test]
async fn test_fetch_failure_isolated() {
    let fetcher = Arc::new(CannedFetcher::default().html(
        "https://a.test/",
        r#"<a href="/broken">broken</a><a href="/fine">fine</a>"#,
    ).html("https://a.test/fine", "<p>fine</p>"));
    let sink = Arc::new(MemorySink::new());

    let engine = run_engine(fetcher, sink.clone(), 2);
    let report = engine.start(&[url("https://a.test/")]).await;

    assert_eq!(report.fetch_failures, 1);
    assert_eq!(sink.by_category(RecordCategory::Page).len(), 2);
}

#[tokio::test]
async fn test_broken_pdf_persisted_with_error() {
    let fetcher = Arc::new(CannedFetcher::default().serve(
        "https://a.test/broken.pdf",
        "https://a.test/broken.pdf",
        "application/pdf",
        b"not a pdf at all",
    ));
    let sink = Arc::new(MemorySink::new());

    let engine = run_engine(fetcher, sink.clone(), 1);
    let report = engine.start(&[url("https://a.test/broken.pdf")]).await;

    let documents = sink.by_category(RecordCategory::Document);
    assert_eq!(documents.len(), 1);
    match &documents[0] {
        Record::Document(doc) => {
            assert_eq!(doc.extracted_text, "");
            assert!(doc.metadata.contains_key(EXTRACTION_ERROR_KEY));
            assert_eq!(doc.raw_bytes, b"not a pdf at all");
        }
        other => panic!("unexpected record {:?}", other),
    }
    assert_eq!(report.extraction_failures, 1);
}

#[tokio::test]
async fn test_json_layout_by_category() {
    let fetcher = Arc::new(
        CannedFetcher::default()
            .html("https://a.test/", r#"<a href="/notes.txt">notes</a>"#)
            .serve(
                "https://a.test/seed.txt",
                "https://a.test/seed.txt",
                "text/plain",
                b"seed text",
            ),
    );
    let temp_dir = TempDir::new().unwrap();
    let memory = Arc::new(MemorySink::new());
    let json = Arc::new(JsonSink::new(temp_dir.path()).unwrap());
    let sink = Arc::new(FanoutSink::new().with(json).with(memory.clone()));

    let engine = run_engine(fetcher, sink, 2);
    engine
        .start(&[url("https://a.test/"), url("https://a.test/seed.txt")])
        .await;

    let count = |folder: &str| std::fs::read_dir(temp_dir.path().join(folder)).unwrap().count();
    assert_eq!(count("pages"), 1);
    assert_eq!(count("links"), 1);
    assert_eq!(count("documents"), 1);
    assert_eq!(memory.len(), 3);

    let document = std::fs::read_dir(temp_dir.path().join("documents"))
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .path();
    assert!(document.to_string_lossy().ends_with("-document.json"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(document).unwrap()).unwrap();
    assert_eq!(json["extractedText"], "seed text");
    assert_eq!(json["fileType"], "txt");
    // base64 of "seed text"
    assert_eq!(json["rawBytes"], "c2VlZCB0ZXh0");
}
