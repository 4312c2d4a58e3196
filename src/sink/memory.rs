//! In-memory sink for tests and embedding

use crate::records::{Record, RecordCategory};
use crate::sink::traits::{Sink, SinkError, SinkResult};
use std::sync::Mutex;

/// Keeps every persisted record in insertion order
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(RecordCategory, Record)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies of all records persisted so far
    pub fn records(&self) -> Vec<(RecordCategory, Record)> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Records of one category
    pub fn by_category(&self, category: RecordCategory) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|(c, _)| *c == category)
            .map(|(_, record)| record)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for MemorySink {
    fn persist(&self, record: &Record, category: RecordCategory) -> SinkResult<()> {
        self.records
            .lock()
            .map_err(|_| SinkError::Poisoned)?
            .push((category, record.clone()));
        Ok(())
    }
}
