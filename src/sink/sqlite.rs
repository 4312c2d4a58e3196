//! SQLite sink implementation
//!
//! Pages and documents are keyed by URL and links by (source, target), so
//! re-persisting a record replaces the earlier row.

use crate::records::{DocumentRecord, LinkRef, PageRecord, Record, RecordCategory};
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{Sink, SinkError, SinkResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQLite record store
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteSink)` - Successfully opened/created database
    /// * `Err(SinkError)` - Failed to open database
    pub fn new(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of rows in the table a category is stored in
    pub fn count(&self, category: RecordCategory) -> SinkResult<u64> {
        let conn = self.conn.lock().map_err(|_| SinkError::Poisoned)?;
        let sql = format!("SELECT COUNT(*) FROM {}", table_for(category));
        let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn insert_page(conn: &Connection, page: &PageRecord) -> SinkResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO pages
                (url, title, extracted_text, meta_description, meta_keywords, headers,
                 images, raw_html, status, content_type, size, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                page.url,
                page.title,
                page.extracted_text,
                page.meta_description,
                page.meta_keywords,
                serde_json::to_string(&page.headers)?,
                serde_json::to_string(&page.images)?,
                page.raw_html,
                page.status,
                page.content_type,
                page.size as i64,
                page.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn insert_document(conn: &Connection, doc: &DocumentRecord) -> SinkResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO documents
                (url, filename, file_type, extracted_text, metadata, page_count, size,
                 raw_bytes, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                doc.url,
                doc.filename,
                doc.file_type,
                doc.extracted_text,
                serde_json::to_string(&doc.metadata)?,
                doc.page_count,
                doc.size as i64,
                doc.raw_bytes,
                doc.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn insert_link(conn: &Connection, link: &LinkRef) -> SinkResult<()> {
        conn.execute(
            "INSERT OR REPLACE INTO links
                (source_url, target_url, link_text, link_type, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                link.source_url,
                link.target_url,
                link.link_text,
                link.link_type.as_str(),
                link.timestamp.map(|ts| ts.to_rfc3339()),
            ],
        )?;
        Ok(())
    }
}

fn table_for(category: RecordCategory) -> &'static str {
    match category {
        RecordCategory::Page => "pages",
        RecordCategory::Document => "documents",
        RecordCategory::Link => "links",
    }
}

impl Sink for SqliteSink {
    fn persist(&self, record: &Record, _category: RecordCategory) -> SinkResult<()> {
        let conn = self.conn.lock().map_err(|_| SinkError::Poisoned)?;
        match record {
            Record::Page(page) => Self::insert_page(&conn, page),
            Record::Document(doc) => Self::insert_document(&conn, doc),
            Record::Link(link) => Self::insert_link(&conn, link),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::LinkType;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn document(url: &str, text: &str) -> DocumentRecord {
        DocumentRecord {
            url: url.to_string(),
            filename: "report.pdf".to_string(),
            file_type: "pdf".to_string(),
            raw_bytes: vec![1, 2, 3],
            extracted_text: text.to_string(),
            metadata: BTreeMap::from([("title".to_string(), "Report".to_string())]),
            size: 3,
            timestamp: Utc::now(),
            page_count: Some(2),
        }
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteSink::new_in_memory().is_ok());
    }

    #[test]
    fn test_document_replaced_by_url() {
        let sink = SqliteSink::new_in_memory().unwrap();
        let first = Record::Document(document("https://a.test/r.pdf", "old"));
        let second = Record::Document(document("https://a.test/r.pdf", "new"));

        sink.persist(&first, RecordCategory::Document).unwrap();
        sink.persist(&second, RecordCategory::Document).unwrap();

        assert_eq!(sink.count(RecordCategory::Document).unwrap(), 1);

        let conn = sink.conn.lock().unwrap();
        let (text, page_count, bytes): (String, Option<u32>, Vec<u8>) = conn
            .query_row(
                "SELECT extracted_text, page_count, raw_bytes FROM documents",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();
        assert_eq!(text, "new");
        assert_eq!(page_count, Some(2));
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_links_keyed_by_source_and_target() {
        let sink = SqliteSink::new_in_memory().unwrap();
        let link = |source: &str, target: &str| {
            Record::Link(LinkRef {
                source_url: source.to_string(),
                target_url: target.to_string(),
                link_text: String::new(),
                link_type: LinkType::External,
                timestamp: None,
            })
        };

        sink.persist(&link("https://a.test/", "https://b.test/"), RecordCategory::Link)
            .unwrap();
        sink.persist(&link("https://a.test/", "https://b.test/"), RecordCategory::Link)
            .unwrap();
        sink.persist(&link("https://a.test/x", "https://b.test/"), RecordCategory::Link)
            .unwrap();

        assert_eq!(sink.count(RecordCategory::Link).unwrap(), 2);
    }

    #[test]
    fn test_on_disk_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("records.db");
        let sink = SqliteSink::new(&path).unwrap();
        sink.persist(
            &Record::Document(document("https://a.test/d.pdf", "")),
            RecordCategory::Document,
        )
        .unwrap();
        assert!(path.exists());
    }
}
