//! Record sinks
//!
//! This module contains the destinations records are persisted to:
//! - JSON files grouped by category
//! - A SQLite database
//! - An in-memory list (tests and embedding)
//! - A fan-out that writes to several sinks in order

mod json;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use json::JsonSink;
pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{Sink, SinkError, SinkResult};

use crate::records::{Record, RecordCategory};
use std::sync::Arc;

/// Writes every record to each inner sink, stopping at the first error
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn Sink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl Sink for FanoutSink {
    fn persist(&self, record: &Record, category: RecordCategory) -> SinkResult<()> {
        for sink in &self.sinks {
            sink.persist(record, category)?;
        }
        Ok(())
    }
}
