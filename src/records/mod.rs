//! Record types produced by the crawl and consumed by the pipeline

mod types;

pub use types::{
    DocumentRecord, FetchedResource, Headings, ImageRef, LinkRef, LinkType, PageRecord, Record,
    RecordCategory,
};
