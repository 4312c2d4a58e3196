//! Document classification
//!
//! Decides whether a fetched resource is a downloadable document or an HTML
//! page, which extractor applies to it, and how a discovered link relates to
//! the page it was found on.

use crate::config::DEFAULT_DOCUMENT_EXTENSIONS;
use crate::records::LinkType;
use crate::url::{file_extension, network_location};
use std::collections::HashSet;
use url::Url;

/// Document content types and the file type each one maps to
///
/// Matched case-insensitively by substring, first match wins. The
/// wordprocessingml/spreadsheetml/presentationml entries never contain the
/// legacy entries as substrings, so order only matters for readability.
const DOCUMENT_CONTENT_TYPES: &[(&str, &str)] = &[
    ("application/pdf", "pdf"),
    ("application/msword", "doc"),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "docx",
    ),
    ("application/vnd.ms-excel", "xls"),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xlsx",
    ),
    ("application/vnd.ms-powerpoint", "ppt"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "pptx",
    ),
    ("text/plain", "txt"),
    ("application/rtf", "rtf"),
];

/// Outcome of classifying one resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub is_document: bool,
    /// Lowercase extension-style file type, empty for pages
    pub file_type: String,
}

impl Classification {
    fn page() -> Self {
        Self {
            is_document: false,
            file_type: String::new(),
        }
    }

    fn document(file_type: impl Into<String>) -> Self {
        Self {
            is_document: true,
            file_type: file_type.into(),
        }
    }
}

/// Extractor family a document is handled by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Word,
    Spreadsheet,
    Presentation,
    PlainText,
    Rtf,
    Html,
    Unsupported,
}

impl DocumentKind {
    /// Maps a file type (as produced by [`DocumentClassifier::classify`]) to
    /// its extractor family
    pub fn from_file_type(file_type: &str) -> Self {
        match file_type.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "doc" | "docx" => Self::Word,
            "xls" | "xlsx" | "xlsm" | "xlsb" => Self::Spreadsheet,
            "ppt" | "pptx" => Self::Presentation,
            "txt" | "text" => Self::PlainText,
            "rtf" => Self::Rtf,
            "html" | "htm" => Self::Html,
            _ => Self::Unsupported,
        }
    }

    /// Returns the string representation of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Word => "word",
            Self::Spreadsheet => "spreadsheet",
            Self::Presentation => "presentation",
            Self::PlainText => "text",
            Self::Rtf => "rtf",
            Self::Html => "html",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Classifies resources and links against a configured document extension set
#[derive(Debug, Clone)]
pub struct DocumentClassifier {
    extensions: HashSet<String>,
}

impl Default for DocumentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT_EXTENSIONS.iter().copied())
    }
}

impl DocumentClassifier {
    /// Creates a classifier for the given extensions (without leading dots)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Returns true if the URL's extension is in the document set
    pub fn is_document_url(&self, url: &Url) -> bool {
        file_extension(url).map_or(false, |ext| self.extensions.contains(&ext))
    }

    /// Classifies a resource by URL extension, then by content type
    ///
    /// # Arguments
    ///
    /// * `url` - Final URL of the resource
    /// * `content_type` - Value of the Content-Type header (may be empty)
    ///
    /// # Returns
    ///
    /// A document classification with its file type, or a page
    /// classification with an empty file type
    pub fn classify(&self, url: &Url, content_type: &str) -> Classification {
        if let Some(ext) = file_extension(url) {
            if self.extensions.contains(&ext) {
                return Classification::document(ext);
            }
        }

        let content_type = content_type.to_lowercase();
        DOCUMENT_CONTENT_TYPES
            .iter()
            .find(|(mime, _)| content_type.contains(mime))
            .map(|(_, file_type)| Classification::document(*file_type))
            .unwrap_or_else(Classification::page)
    }

    /// Classifies an anchor target relative to the page it was found on
    ///
    /// Document extensions win over locality; otherwise targets sharing the
    /// source's network location are internal and everything else external.
    pub fn classify_link(&self, target: &Url, source: &Url) -> LinkType {
        if self.is_document_url(target) {
            LinkType::Document
        } else if network_location(target) == network_location(source) {
            LinkType::Internal
        } else {
            LinkType::External
        }
    }
}
