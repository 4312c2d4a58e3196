//! Record pipeline
//!
//! Every record the crawl engine emits runs through an ordered list of
//! stages. A stage either hands the (possibly modified) record to the next
//! stage or drops it with a reason. The standard pipeline is:
//!
//! 1. [`Validate`]: drop records without a URL
//! 2. [`Deduplicate`]: drop records whose key was seen before
//! 3. [`Enrich`]: extract document text and metadata
//! 4. [`Persist`]: stamp and write to the sink

mod stages;

pub use stages::{Deduplicate, Enrich, Persist, Validate, EXTRACTION_ERROR_KEY};

use crate::records::Record;
use crate::sink::Sink;
use crate::stats::CrawlStats;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// A record removed from the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dropped by {stage}: {reason}")]
pub struct Dropped {
    /// Name of the stage that dropped the record
    pub stage: &'static str,
    pub reason: String,
}

impl Dropped {
    pub fn new(stage: &'static str, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

/// One step of the record pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Short name used in logs and drop statistics
    fn name(&self) -> &'static str;

    /// Processes a record, returning it for the next stage or dropping it
    async fn process(&self, record: Record) -> Result<Record, Dropped>;
}

/// Ordered chain of stages
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    stats: Arc<CrawlStats>,
}

impl Pipeline {
    /// Creates an empty pipeline reporting drops into `stats`
    pub fn new(stats: Arc<CrawlStats>) -> Self {
        Self {
            stages: Vec::new(),
            stats,
        }
    }

    /// Validate, deduplicate, enrich and persist into `sink`
    pub fn standard(sink: Arc<dyn Sink>, stats: Arc<CrawlStats>) -> Self {
        let mut pipeline = Self::new(Arc::clone(&stats));
        pipeline.push(Validate);
        pipeline.push(Deduplicate::new());
        pipeline.push(Enrich::new(Arc::clone(&stats)));
        pipeline.push(Persist::new(sink, stats));
        pipeline
    }

    /// Appends a stage to the end of the chain
    pub fn push(&mut self, stage: impl Stage + 'static) {
        self.stages.push(Box::new(stage));
    }

    /// Stage names in execution order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn stats(&self) -> &Arc<CrawlStats> {
        &self.stats
    }

    /// Runs a record through every stage in order
    ///
    /// # Returns
    ///
    /// * `Ok(Record)` - The record as the last stage left it
    /// * `Err(Dropped)` - The first stage that dropped it, and why
    pub async fn process(&self, record: Record) -> Result<Record, Dropped> {
        let mut record = record;

        for stage in &self.stages {
            record = match stage.process(record).await {
                Ok(record) => record,
                Err(dropped) => {
                    debug!("Record {}", dropped);
                    self.stats.record_drop(dropped.stage);
                    return Err(dropped);
                }
            };
        }

        Ok(record)
    }
}
