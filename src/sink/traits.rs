//! Sink trait and error types
//!
//! A sink is the final destination of a record. The persist stage calls it
//! from a blocking task, so implementations may do synchronous I/O.

use crate::records::{Record, RecordCategory};
use thiserror::Error;

/// Errors that can occur while persisting a record
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Sink lock poisoned")]
    Poisoned,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for processed records
///
/// Implementations must be safe to call from several blocking tasks at once.
pub trait Sink: Send + Sync {
    /// Persists one record under its category
    ///
    /// # Arguments
    ///
    /// * `record` - The stamped record
    /// * `category` - Category the record is filed under
    fn persist(&self, record: &Record, category: RecordCategory) -> SinkResult<()>;
}
