//! One-JSON-file-per-record sink

use crate::records::{Record, RecordCategory};
use crate::sink::traits::{Sink, SinkResult};
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

const CATEGORIES: [RecordCategory; 3] = [
    RecordCategory::Page,
    RecordCategory::Document,
    RecordCategory::Link,
];

/// Writes each record as pretty-printed JSON under `<root>/<category folder>/`
///
/// File names are `<UTC timestamp>-<sequence>-<category>.json`. The sequence
/// keeps names unique when several records are written in the same
/// microsecond.
#[derive(Debug)]
pub struct JsonSink {
    root: PathBuf,
    sequence: AtomicU64,
}

impl JsonSink {
    /// Creates the sink and its category folders
    pub fn new(root: impl Into<PathBuf>) -> SinkResult<Self> {
        let root = root.into();
        for category in CATEGORIES {
            fs::create_dir_all(root.join(category.folder()))?;
        }
        Ok(Self {
            root,
            sequence: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, category: RecordCategory) -> PathBuf {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}-{:06}-{}.json",
            Utc::now().format("%Y%m%dT%H%M%S%.6fZ"),
            sequence,
            category
        );
        self.root.join(category.folder()).join(name)
    }
}

impl Sink for JsonSink {
    fn persist(&self, record: &Record, category: RecordCategory) -> SinkResult<()> {
        let path = self.path_for(category);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        write_json(&path, record)
    }
}

/// Writes `value` to a `.part` file next to `path` and renames it into
/// place, so a failed write never leaves a truncated record behind
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> SinkResult<()> {
    let partial = path.with_extension("json.part");

    let write = || -> SinkResult<()> {
        let mut writer = BufWriter::new(File::create(&partial)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
        drop(writer);
        fs::rename(&partial, path)?;
        Ok(())
    };

    let written = write();
    if written.is_err() {
        let _ = fs::remove_file(&partial);
    }
    written
}
