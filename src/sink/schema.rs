//! Database schema definitions
//!
//! This module contains the SQL schema for the record database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- HTML pages, one row per URL
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    extracted_text TEXT NOT NULL,
    meta_description TEXT NOT NULL,
    meta_keywords TEXT NOT NULL,
    headers TEXT NOT NULL,
    images TEXT NOT NULL,
    raw_html TEXT NOT NULL,
    status INTEGER NOT NULL,
    content_type TEXT NOT NULL,
    size INTEGER NOT NULL,
    fetched_at TEXT NOT NULL
);

-- Documents with their extracted text and metadata
CREATE TABLE IF NOT EXISTS documents (
    url TEXT PRIMARY KEY,
    filename TEXT NOT NULL,
    file_type TEXT NOT NULL,
    extracted_text TEXT NOT NULL,
    metadata TEXT NOT NULL,
    page_count INTEGER,
    size INTEGER NOT NULL,
    raw_bytes BLOB NOT NULL,
    fetched_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_file_type ON documents(file_type);

-- Link graph
CREATE TABLE IF NOT EXISTS links (
    source_url TEXT NOT NULL,
    target_url TEXT NOT NULL,
    link_text TEXT NOT NULL,
    link_type TEXT NOT NULL,
    discovered_at TEXT,
    PRIMARY KEY (source_url, target_url)
);

CREATE INDEX IF NOT EXISTS idx_links_target ON links(target_url);
CREATE INDEX IF NOT EXISTS idx_links_type ON links(link_type);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
