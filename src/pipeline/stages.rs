//! Standard pipeline stages

use crate::classify::DocumentKind;
use crate::extract::{extract, extract_metadata};
use crate::pipeline::{Dropped, Stage};
use crate::records::{DocumentRecord, Record};
use crate::sink::Sink;
use crate::stats::CrawlStats;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashSet;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Metadata key recording why no text could be extracted
pub const EXTRACTION_ERROR_KEY: &str = "extraction_error";

/// Drops records without a URL (for links, without a target)
#[derive(Debug, Default)]
pub struct Validate;

#[async_trait]
impl Stage for Validate {
    fn name(&self) -> &'static str {
        "validate"
    }

    async fn process(&self, record: Record) -> Result<Record, Dropped> {
        if record.url().trim().is_empty() {
            return Err(Dropped::new(
                self.name(),
                format!("{} record without url", record.category()),
            ));
        }
        Ok(record)
    }
}

/// Drops records whose key was already seen; the first one wins
#[derive(Debug, Default)]
pub struct Deduplicate {
    seen: DashSet<String>,
}

impl Deduplicate {
    pub fn new() -> Self {
        Self::default()
    }

    fn fingerprint(record: &Record) -> String {
        hex::encode(Sha256::digest(record.dedup_key().as_bytes()))
    }
}

#[async_trait]
impl Stage for Deduplicate {
    fn name(&self) -> &'static str {
        "deduplicate"
    }

    async fn process(&self, record: Record) -> Result<Record, Dropped> {
        if self.seen.insert(Self::fingerprint(&record)) {
            Ok(record)
        } else {
            Err(Dropped::new(
                self.name(),
                format!("duplicate {}", record.dedup_key()),
            ))
        }
    }
}

/// Extracts text and embedded metadata from documents
///
/// Runs on the blocking pool. Extraction failures never drop the record:
/// the text stays empty and the reasons land in the metadata under
/// [`EXTRACTION_ERROR_KEY`].
pub struct Enrich {
    stats: Arc<CrawlStats>,
}

impl Enrich {
    pub fn new(stats: Arc<CrawlStats>) -> Self {
        Self { stats }
    }

    async fn enrich(&self, mut doc: DocumentRecord) -> DocumentRecord {
        let kind = DocumentKind::from_file_type(&doc.file_type);
        if kind == DocumentKind::Unsupported {
            warn!(
                "No extractor for file type '{}' ({})",
                doc.file_type, doc.url
            );
            return doc;
        }

        let bytes = std::mem::take(&mut doc.raw_bytes);
        let outcome = tokio::task::spawn_blocking(move || {
            let extraction = extract(kind, &bytes);
            let metadata = extract_metadata(kind, &bytes);
            (bytes, extraction, metadata)
        })
        .await;

        let (bytes, extraction, metadata) = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                // raw bytes were moved into the task and are lost with it
                error!("Extraction task for {} failed: {}", doc.url, e);
                doc.metadata
                    .insert(EXTRACTION_ERROR_KEY.to_string(), e.to_string());
                self.stats.record_extraction_failure();
                return doc;
            }
        };
        doc.raw_bytes = bytes;

        for failure in &extraction.failures {
            warn!(
                "{} extraction of {} via {} failed: {}",
                kind.as_str(),
                doc.url,
                failure.method,
                failure.error
            );
        }
        if extraction.is_failed() {
            doc.metadata.insert(
                EXTRACTION_ERROR_KEY.to_string(),
                extraction.failure_summary(),
            );
            self.stats.record_extraction_failure();
        }
        doc.extracted_text = extraction.text;

        match metadata {
            Ok(metadata) => {
                doc.page_count = metadata.page_count.or(doc.page_count);
                doc.metadata.extend(metadata.fields);
            }
            Err(e) => warn!("Metadata extraction for {} failed: {}", doc.url, e),
        }

        debug!(
            "Extracted {} chars from {}",
            doc.extracted_text.len(),
            doc.url
        );
        doc
    }
}

#[async_trait]
impl Stage for Enrich {
    fn name(&self) -> &'static str {
        "enrich"
    }

    async fn process(&self, record: Record) -> Result<Record, Dropped> {
        match record {
            Record::Document(doc) => Ok(Record::Document(self.enrich(doc).await)),
            other => Ok(other),
        }
    }
}

/// Stamps records and writes them to the sink
///
/// A sink error is logged and the record is lost; it is reported as a drop
/// by this stage.
pub struct Persist {
    sink: Arc<dyn Sink>,
    stats: Arc<CrawlStats>,
}

impl Persist {
    pub fn new(sink: Arc<dyn Sink>, stats: Arc<CrawlStats>) -> Self {
        Self { sink, stats }
    }
}

#[async_trait]
impl Stage for Persist {
    fn name(&self) -> &'static str {
        "persist"
    }

    async fn process(&self, mut record: Record) -> Result<Record, Dropped> {
        record.stamp(Utc::now());
        let category = record.category();
        let sink = Arc::clone(&self.sink);

        let outcome = tokio::task::spawn_blocking(move || {
            let result = sink.persist(&record, category);
            (record, result)
        })
        .await;

        match outcome {
            Ok((record, Ok(()))) => {
                self.stats.record_persisted();
                Ok(record)
            }
            Ok((record, Err(e))) => {
                error!("Failed to persist {} {}: {}", category, record.url(), e);
                Err(Dropped::new(self.name(), e.to_string()))
            }
            Err(e) => {
                error!("Persist task for {} record failed: {}", category, e);
                Err(Dropped::new(self.name(), e.to_string()))
            }
        }
    }
}
