//! End-of-crawl summary

use std::collections::BTreeMap;
use std::time::Duration;

/// Counters of a finished crawl
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrawlReport {
    /// Fetches attempted, failures included
    pub fetches: u64,
    pub fetch_failures: u64,
    pub depth_limited: u64,

    /// Records emitted into the pipeline, by category
    pub pages: u64,
    pub documents: u64,
    pub links: u64,

    /// Records that reached the sink
    pub persisted: u64,

    pub extraction_failures: u64,

    /// Records dropped, keyed by stage name
    pub dropped: BTreeMap<String, u64>,

    pub elapsed: Duration,
}

impl CrawlReport {
    pub fn total_dropped(&self) -> u64 {
        self.dropped.values().sum()
    }

    /// Records emitted into the pipeline
    pub fn total_records(&self) -> u64 {
        self.pages + self.documents + self.links
    }
}

/// Prints the report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &CrawlReport) {
    println!("=== Crawl Statistics ===\n");

    println!("Fetching:");
    println!("  Requests: {}", report.fetches);
    println!("  Failed: {}", report.fetch_failures);
    println!("  Dropped at depth limit: {}", report.depth_limited);
    println!();

    println!("Records:");
    println!("  Pages: {}", report.pages);
    println!("  Documents: {}", report.documents);
    println!("  Links: {}", report.links);
    println!("  Persisted: {}", report.persisted);
    if report.extraction_failures > 0 {
        println!("  Documents without text: {}", report.extraction_failures);
    }
    println!();

    if !report.dropped.is_empty() {
        println!("Dropped by Stage:");
        let mut counts: Vec<_> = report.dropped.iter().collect();
        counts.sort_by(|a, b| b.1.cmp(a.1));
        for (stage, count) in counts {
            println!("  {}: {}", stage, count);
        }
        println!();
    }

    let total = report.total_records();
    let rate = if total > 0 {
        (report.persisted as f64 / total as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Persisted {:.1}% ({} / {} records) in {:.1}s",
        rate,
        report.persisted,
        total,
        report.elapsed.as_secs_f64()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let mut dropped = BTreeMap::new();
        dropped.insert("deduplicate".to_string(), 4);
        dropped.insert("persist".to_string(), 1);

        let report = CrawlReport {
            pages: 3,
            documents: 2,
            links: 10,
            persisted: 10,
            dropped,
            ..CrawlReport::default()
        };

        assert_eq!(report.total_records(), 15);
        assert_eq!(report.total_dropped(), 5);
    }
}
