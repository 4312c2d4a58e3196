//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end through the HTTP fetcher.

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use url::Url;
use webharvest::config::{Config, CrawlerConfig, FetcherConfig, OutputConfig};
use webharvest::crawler::{crawl, CrawlEngine, HttpFetcher};
use webharvest::pipeline::Pipeline;
use webharvest::records::{LinkType, Record, RecordCategory};
use webharvest::sink::MemorySink;
use webharvest::stats::CrawlStats;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Creates a fast test configuration for the given seeds
fn create_test_config(seeds: Vec<String>, output: &Path, max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            seeds,
            ..CrawlerConfig::default()
        },
        fetcher: FetcherConfig {
            download_delay_ms: 0,
            retry_times: 0,
            user_agent: "TestBot/1.0".to_string(),
            ..FetcherConfig::default()
        },
        output: OutputConfig {
            directory: output.to_string_lossy().into_owned(),
            database_path: None,
        },
    }
}

fn engine_for(config: &Config) -> (CrawlEngine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let pipeline = Pipeline::standard(sink.clone(), Arc::new(CrawlStats::new()));
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher).expect("client"));
    let engine = CrawlEngine::new(fetcher, pipeline).with_max_depth(config.crawler.max_depth);
    (engine, sink)
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

fn docx(paragraphs: &[&str], title: &str) -> Vec<u8> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );
    let core = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>{}</dc:title></cp:coreProperties>"#,
        title
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [("word/document.xml", document), ("docProps/core.xml", core)] {
        writer
            .start_file(name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(&mock_server)
        .await;

    mount_html(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title></head><body>
            <a href="{}/page1">Page 1</a>
            <a href="/page2">Page 2</a>
            <a href="https://elsewhere.test/">Elsewhere</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;
    mount_html(
        &mock_server,
        "/page1",
        r#"<html><head><title>Page 1</title></head><body><a href="/">Home</a><a href="/page2">Two</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/page2",
        r#"<html><head><title>Page 2</title></head><body><p>End</p></body></html>"#.to_string(),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp_dir.path(), 3);
    let (engine, sink) = engine_for(&config);

    let seed = Url::parse(&format!("{}/", base_url)).unwrap();
    let report = engine.start(&[seed]).await;

    let mut titles: Vec<String> = sink
        .by_category(RecordCategory::Page)
        .into_iter()
        .map(|record| match record {
            Record::Page(page) => page.title,
            other => panic!("unexpected record {:?}", other),
        })
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Home", "Page 1", "Page 2"]);

    // Each page fetched exactly once even though they link to each other
    let requests = mock_server.received_requests().await.unwrap();
    let page_requests = requests
        .iter()
        .filter(|r| r.url.path() != "/robots.txt")
        .count();
    assert_eq!(page_requests, 3);
    assert_eq!(report.fetches, 3);
    assert_eq!(report.fetch_failures, 0);

    let external = sink
        .by_category(RecordCategory::Link)
        .into_iter()
        .filter(|record| matches!(record, Record::Link(link) if link.link_type == LinkType::External))
        .count();
    assert_eq!(external, 1);
}

#[tokio::test]
async fn test_document_link_recorded_not_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><body><a href="/b">B</a><a href="/report.pdf">Report</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(&mock_server, "/b", "<html><body>b</body></html>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp_dir.path(), 1);
    let (engine, sink) = engine_for(&config);

    let report = engine
        .start(&[Url::parse(&format!("{}/", base_url)).unwrap()])
        .await;

    assert_eq!(sink.by_category(RecordCategory::Page).len(), 1);
    assert_eq!(sink.by_category(RecordCategory::Link).len(), 2);
    assert_eq!(sink.by_category(RecordCategory::Document).len(), 0);
    assert_eq!(report.depth_limited, 1);
}

#[tokio::test]
async fn test_word_document_seed_extracted() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/files/minutes.docx"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(docx(&["First point", "Second point"], "Minutes"))
                .insert_header(
                    "content-type",
                    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
                )
                .insert_header("last-modified", "Mon, 07 Oct 2024 08:00:00 GMT"),
        )
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let seed = format!("{}/files/minutes.docx", base_url);
    let config = create_test_config(vec![seed.clone()], temp_dir.path(), 2);
    let (engine, sink) = engine_for(&config);

    engine.start(&[Url::parse(&seed).unwrap()]).await;

    let documents = sink.by_category(RecordCategory::Document);
    assert_eq!(documents.len(), 1);
    match &documents[0] {
        Record::Document(doc) => {
            assert_eq!(doc.filename, "minutes.docx");
            assert_eq!(doc.file_type, "docx");
            assert_eq!(doc.extracted_text, "First point\nSecond point");
            assert_eq!(doc.metadata.get("title").map(String::as_str), Some("Minutes"));
            assert_eq!(
                doc.metadata.get("last-modified").map(String::as_str),
                Some("Mon, 07 Oct 2024 08:00:00 GMT")
            );
            assert!(!doc.metadata.contains_key("extraction_error"));
        }
        other => panic!("unexpected record {:?}", other),
    }
}

#[tokio::test]
async fn test_robots_disallowed_page_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/",
        r#"<html><body><a href="/private/secret">Secret</a><a href="/public">Public</a></body></html>"#
            .to_string(),
    )
    .await;
    mount_html(&mock_server, "/public", "<p>public</p>".to_string()).await;
    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(vec![format!("{}/", base_url)], temp_dir.path(), 3);
    let (engine, sink) = engine_for(&config);

    let report = engine
        .start(&[Url::parse(&format!("{}/", base_url)).unwrap()])
        .await;

    assert_eq!(sink.by_category(RecordCategory::Page).len(), 2);
    assert_eq!(report.fetch_failures, 1);
}

#[tokio::test]
async fn test_crawl_writes_json_and_database() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_html(
        &mock_server,
        "/",
        r#"<html><head><title>Only</title></head><body><a href="/notes.txt">Notes</a></body></html>"#
            .to_string(),
    )
    .await;

    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("data");
    let database = temp_dir.path().join("records.db");

    let mut config = create_test_config(vec![format!("{}/", base_url)], &output, 2);
    config.output.database_path = Some(database.to_string_lossy().into_owned());

    let report = crawl(config).await.unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.links, 1);
    assert_eq!(report.persisted, 2);

    let page_files: Vec<_> = std::fs::read_dir(output.join("pages"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(page_files.len(), 1);

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&page_files[0]).unwrap()).unwrap();
    assert_eq!(json["title"], "Only");
    assert_eq!(json["links"][0]["linkType"], "document");
    assert!(json["rawHTML"].as_str().unwrap().contains("<title>Only</title>"));

    assert_eq!(std::fs::read_dir(output.join("links")).unwrap().count(), 1);
    assert_eq!(std::fs::read_dir(output.join("documents")).unwrap().count(), 0);

    let conn = rusqlite::Connection::open(&database).unwrap();
    let pages: i64 = conn
        .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
        .unwrap();
    assert_eq!(pages, 1);
}

#[tokio::test]
async fn test_crawl_without_seeds_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(Vec::new(), temp_dir.path(), 1);
    assert!(matches!(
        crawl(config).await,
        Err(webharvest::HarvestError::NoSeeds)
    ));
}
