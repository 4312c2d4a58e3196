use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// A completed fetch as handed over by a [`Fetcher`](crate::crawler::Fetcher)
///
/// `url` is the final URL after redirects. Header names keep the case the
/// server sent; lookups through [`FetchedResource::header`] ignore it.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub url: Url,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub content_type: String,
}

impl FetchedResource {
    /// Returns the first value of a header, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// How a discovered link relates to the page it was found on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Same network location as the source page; eligible for follow-up fetch
    Internal,
    /// Different network location
    External,
    /// Target has a document extension; recorded, never followed
    Document,
    /// `[src]` reference (images, scripts, iframes); never followed
    Resource,
}

impl LinkType {
    /// Returns the string representation of the link type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Document => "document",
            Self::Resource => "resource",
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A link discovered on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRef {
    #[serde(rename = "sourceURL")]
    pub source_url: String,

    #[serde(rename = "targetURL")]
    pub target_url: String,

    #[serde(rename = "linkText")]
    pub link_text: String,

    #[serde(rename = "linkType")]
    pub link_type: LinkType,

    /// Set when the link is persisted as a record of its own
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// An image found on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub alt: String,
}

/// Heading texts of a page, grouped by level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headings {
    pub h1: Vec<String>,
    pub h2: Vec<String>,
    pub h3: Vec<String>,
    pub h4: Vec<String>,
    pub h5: Vec<String>,
    pub h6: Vec<String>,
}

impl Headings {
    /// Returns the list for heading level `1..=6`
    pub fn level_mut(&mut self, level: u8) -> Option<&mut Vec<String>> {
        match level {
            1 => Some(&mut self.h1),
            2 => Some(&mut self.h2),
            3 => Some(&mut self.h3),
            4 => Some(&mut self.h4),
            5 => Some(&mut self.h5),
            6 => Some(&mut self.h6),
            _ => None,
        }
    }
}

/// An HTML page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    #[serde(rename = "rawHTML")]
    pub raw_html: String,
    pub extracted_text: String,
    pub links: Vec<LinkRef>,
    pub images: Vec<ImageRef>,
    pub meta_description: String,
    pub meta_keywords: String,
    pub headers: Headings,
    pub status: u16,
    pub content_type: String,
    pub size: usize,
    pub timestamp: DateTime<Utc>,
}

/// A downloadable document (PDF, Word, spreadsheet, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    pub url: String,
    pub filename: String,
    pub file_type: String,
    #[serde(with = "base64_bytes")]
    pub raw_bytes: Vec<u8>,
    pub extracted_text: String,
    pub metadata: BTreeMap<String, String>,
    pub size: usize,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

/// Destination category of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordCategory {
    Page,
    Document,
    Link,
}

impl RecordCategory {
    /// Returns the string representation of the category
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Document => "document",
            Self::Link => "link",
        }
    }

    /// Returns the output folder name records of this category are grouped in
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Page => "pages",
            Self::Document => "documents",
            Self::Link => "links",
        }
    }
}

impl std::fmt::Display for RecordCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit the record pipeline processes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Record {
    Page(PageRecord),
    Document(DocumentRecord),
    Link(LinkRef),
}

impl Record {
    /// Returns the category this record is persisted under
    pub fn category(&self) -> RecordCategory {
        match self {
            Self::Page(_) => RecordCategory::Page,
            Self::Document(_) => RecordCategory::Document,
            Self::Link(_) => RecordCategory::Link,
        }
    }

    /// Returns the URL that identifies the record (a link's target)
    pub fn url(&self) -> &str {
        match self {
            Self::Page(page) => &page.url,
            Self::Document(doc) => &doc.url,
            Self::Link(link) => &link.target_url,
        }
    }

    /// Returns the key the deduplication stage hashes
    ///
    /// Pages and documents are keyed by URL, links by their source and
    /// target, each prefixed by category so a page and the link pointing to
    /// it never collide.
    pub fn dedup_key(&self) -> String {
        match self {
            Self::Link(link) => format!(
                "{}:{} -> {}",
                self.category(),
                link.source_url,
                link.target_url
            ),
            _ => format!("{}:{}", self.category(), self.url()),
        }
    }

    /// Stamps the record with the time it is persisted
    pub fn stamp(&mut self, now: DateTime<Utc>) {
        match self {
            Self::Page(page) => page.timestamp = now,
            Self::Document(doc) => doc.timestamp = now,
            Self::Link(link) => link.timestamp = Some(now),
        }
    }
}

impl From<PageRecord> for Record {
    fn from(page: PageRecord) -> Self {
        Self::Page(page)
    }
}

impl From<DocumentRecord> for Record {
    fn from(doc: DocumentRecord) -> Self {
        Self::Document(doc)
    }
}

impl From<LinkRef> for Record {
    fn from(link: LinkRef) -> Self {
        Self::Link(link)
    }
}

/// Serializes raw document bytes as a standard base64 string
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
