//! Document text and metadata extraction
//!
//! Each supported format has its own extractor converting raw bytes into
//! plain text. Extraction never fails from the caller's point of view: every
//! method runs behind a panic boundary, failed methods are recorded in the
//! returned [`Extraction`] and the next method of the format's fallback
//! chain is tried. When every method fails the text is empty.

mod html;
mod ooxml;
mod pdf;
mod presentation;
mod rtf;
mod spreadsheet;
mod text;
mod word;

pub use html::html_to_text;
pub use presentation::PRESENTATION_UNAVAILABLE;
pub use rtf::strip_rtf;
pub use text::decode_text;

#[cfg(test)]
pub(crate) use pdf::test_pdf;

use crate::classify::DocumentKind;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Errors raised inside a single extraction method
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Missing document part: {0}")]
    MissingPart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Extractor panicked: {0}")]
    Panicked(String),
}

/// One extraction method that did not produce text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractFailure {
    /// Name of the method (e.g. `pdf-extract`, `lopdf`)
    pub method: &'static str,
    /// Human-readable reason
    pub error: String,
}

/// Result of running a format's extraction chain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// Methods that failed, in the order they were tried
    pub failures: Vec<ExtractFailure>,
}

impl Extraction {
    /// True when no method produced text, as opposed to a document that
    /// was read successfully but holds no text
    pub fn is_failed(&self) -> bool {
        self.text.is_empty() && !self.failures.is_empty()
    }

    /// Failure reasons joined into one line, for logs and record metadata
    pub fn failure_summary(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.method, f.error))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Metadata read from inside a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub fields: BTreeMap<String, String>,
    pub page_count: Option<u32>,
}

/// A named extraction method
pub(crate) type Method = (&'static str, fn(&[u8]) -> Result<String, ExtractError>);

/// Runs extraction methods in order until one succeeds
///
/// Each method runs behind `catch_unwind`, so a panicking parser counts as
/// a failed method instead of tearing down the worker.
pub(crate) fn run_chain(bytes: &[u8], methods: &[Method]) -> Extraction {
    let mut failures = Vec::new();

    for (name, method) in methods {
        match guarded(|| method(bytes)) {
            Ok(text) => return Extraction { text, failures },
            Err(e) => failures.push(ExtractFailure {
                method: name,
                error: e.to_string(),
            }),
        }
    }

    Extraction {
        text: String::new(),
        failures,
    }
}

/// Calls `f`, converting a panic into [`ExtractError::Panicked`]
fn guarded<T>(f: impl FnOnce() -> Result<T, ExtractError>) -> Result<T, ExtractError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ExtractError::Panicked(message))
        }
    }
}

/// Extracts text from a document of the given kind
///
/// # Arguments
///
/// * `kind` - Extractor family chosen by the classifier
/// * `bytes` - Raw document bytes
///
/// # Returns
///
/// The extracted text and any failed methods. Unsupported kinds yield empty
/// text with no failures.
pub fn extract(kind: DocumentKind, bytes: &[u8]) -> Extraction {
    match kind {
        DocumentKind::Pdf => run_chain(bytes, pdf::METHODS),
        DocumentKind::Word => run_chain(bytes, word::METHODS),
        DocumentKind::Spreadsheet => run_chain(bytes, spreadsheet::METHODS),
        DocumentKind::Presentation => run_chain(bytes, presentation::METHODS),
        DocumentKind::PlainText => run_chain(bytes, text::METHODS),
        DocumentKind::Rtf => run_chain(bytes, rtf::METHODS),
        DocumentKind::Html => run_chain(bytes, html::METHODS),
        DocumentKind::Unsupported => Extraction::default(),
    }
}

/// Reads embedded metadata (PDF info dictionary, Word core properties)
///
/// Kinds without embedded metadata support return an empty result.
pub fn extract_metadata(kind: DocumentKind, bytes: &[u8]) -> Result<DocumentMetadata, ExtractError> {
    match kind {
        DocumentKind::Pdf => guarded(|| pdf::extract_metadata(bytes)),
        DocumentKind::Word => guarded(|| word::extract_metadata(bytes)),
        _ => Ok(DocumentMetadata::default()),
    }
}
