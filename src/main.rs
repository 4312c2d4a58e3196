//! Webharvest main entry point
//!
//! This is the command-line interface for the Webharvest site and document
//! harvester.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use webharvest::config::{load_config_with_hash, validate, Config};
use webharvest::crawler::crawl;
use webharvest::stats::print_report;
use tracing_subscriber::EnvFilter;

/// Webharvest: a depth-bounded site and document harvester
///
/// Webharvest crawls from a set of start URLs, stores every page, document
/// and link it finds as JSON records (and optionally in SQLite), and
/// extracts text from PDF, Word, Excel, PowerPoint, RTF and plain text
/// documents.
#[derive(Parser, Debug)]
#[command(name = "webharvest")]
#[command(version)]
#[command(about = "A depth-bounded site and document harvester", long_about = None)]
struct Cli {
    /// Comma-separated URLs to start crawling from
    #[arg(long, value_delimiter = ',')]
    start_urls: Vec<String>,

    /// Comma-separated domains follow-up fetches are restricted to
    #[arg(long, value_delimiter = ',')]
    allowed_domains: Vec<String>,

    /// Depth at which fetched resources are dropped (seeds are depth 0)
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum number of requests in flight
    #[arg(long)]
    concurrent_requests: Option<u32>,

    /// Seconds between requests to the same host
    #[arg(long)]
    delay: Option<f64>,

    /// Ignore robots.txt
    #[arg(long)]
    no_robots: bool,

    /// Directory receiving the pages/, documents/ and links/ folders
    #[arg(long)]
    output_dir: Option<String>,

    /// SQLite database receiving a copy of every record
    #[arg(long)]
    database: Option<String>,

    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Validate the configuration and show what would be crawled
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli)?;
    validate(&config).context("Invalid configuration")?;

    if config.crawler.seeds.is_empty() {
        bail!("No start URLs given; use --start-urls or [crawler] seeds in the config file");
    }

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(());
    }

    tracing::info!(
        "Starting crawl of {} seed(s) into {}",
        config.crawler.seeds.len(),
        config.output.directory
    );

    let report = crawl(config).await.context("Crawl failed")?;
    tracing::info!("Crawl completed successfully");

    if !cli.quiet {
        print_report(&report);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("webharvest=info,warn"),
            1 => EnvFilter::new("webharvest=debug,info"),
            2 => EnvFilter::new("webharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers command-line flags over the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if !cli.start_urls.is_empty() {
        config.crawler.seeds = trimmed(&cli.start_urls);
    }
    if !cli.allowed_domains.is_empty() {
        config.crawler.allowed_domains = trimmed(&cli.allowed_domains);
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(concurrent) = cli.concurrent_requests {
        config.fetcher.concurrent_requests = concurrent;
    }
    if let Some(delay) = cli.delay {
        if !delay.is_finite() || delay < 0.0 {
            bail!("--delay must be a non-negative number of seconds, got {}", delay);
        }
        config.fetcher.download_delay_ms = (delay * 1000.0).round() as u64;
    }
    if cli.no_robots {
        config.fetcher.obey_robots = false;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.clone();
    }
    if let Some(database) = &cli.database {
        config.output.database_path = Some(database.clone());
    }
    Ok(())
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Webharvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Document extensions: {}",
        config.crawler.document_extensions.join(", ")
    );
    if config.crawler.allowed_domains.is_empty() {
        println!("  Allowed domains: any");
    } else {
        println!(
            "  Allowed domains: {}",
            config.crawler.allowed_domains.join(", ")
        );
    }

    println!("\nFetcher:");
    println!("  Concurrent requests: {}", config.fetcher.concurrent_requests);
    println!("  Delay per host: {}ms", config.fetcher.download_delay_ms);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Retries: {}", config.fetcher.retry_times);
    println!("  Obey robots.txt: {}", config.fetcher.obey_robots);
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    if let Some(path) = &config.output.database_path {
        println!("  Database: {}", path);
    }

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}
