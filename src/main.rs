//! linkrot main entry point
//!
//! This is the command-line interface for the linkrot broken-link crawler.

use anyhow::{bail, Context};
use clap::Parser;
use linkrot::config::{load_config_with_hash, validate, Config};
use linkrot::crawler::{build_http_client, run_crawl};
use linkrot::output::{
    load_run_statistics, notify_if_needed, print_statistics, write_report, WebhookNotifier,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// linkrot: a broken-link crawler
///
/// linkrot crawls a website from its base URL, checks every link it finds (internal,
/// external and resource links, including `#fragment` targets), and writes a report
/// of the broken ones.
#[derive(Parser, Debug)]
#[command(name = "linkrot")]
#[command(version)]
#[command(about = "A broken-link crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run stored in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Override the base URL from the configuration
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Override the page budget from the configuration
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if apply_overrides(&mut config, &cli) {
        validate(&config).context("Invalid command-line override")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linkrot=info,warn"),
            1 => EnvFilter::new("linkrot=debug,info"),
            2 => EnvFilter::new("linkrot=trace,debug"),
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

/// Applies command-line overrides, returning true if anything changed
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;
    if let Some(base_url) = &cli.base_url {
        tracing::info!("Overriding base URL: {}", base_url);
        config.crawler.base_url = base_url.clone();
        changed = true;
    }
    if let Some(max_pages) = cli.max_pages {
        tracing::info!("Overriding page budget: {}", max_pages);
        config.crawler.max_pages = max_pages;
        changed = true;
    }
    changed
}

/// Handles the --dry-run mode: shows the effective crawl settings
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;
    println!("=== linkrot Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", crawler.base_url);
    println!("  Max pages: {}", crawler.max_pages);
    println!("  Max depth: {}", crawler.max_depth);
    println!("  Max concurrency: {}", crawler.max_concurrency);
    println!("  Crawl subdomains: {}", crawler.crawl_subdomains);
    println!("  Check external links: {}", crawler.check_external_links);
    println!("  Content links only: {}", crawler.content_links_only);
    println!("  Request timeout: {}s", crawler.request_timeout_secs);
    println!("  Max retries: {}", crawler.max_retries);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    if let Some(contact) = &config.user_agent.contact_url {
        println!("  Contact URL: {}", contact);
    }

    println!("\nOutput:");
    println!("  Report: {}", config.output.report_path);
    println!("  Summary: {}", config.output.summary_path);
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (disabled)"),
    }
    println!("  Only broken links: {}", config.output.save_only_broken_links);

    println!(
        "\nNotification destinations ({}):",
        config.notify.destinations.len()
    );
    for destination in &config.notify.destinations {
        println!("  - {}", destination);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics of the latest stored run
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let Some(database_path) = &config.output.database_path else {
        bail!("No database-path configured; run statistics are only kept in the database");
    };
    println!("Database: {}\n", database_path);

    match load_run_statistics(Path::new(database_path))
        .with_context(|| format!("Failed to read {}", database_path))?
    {
        Some(stats) => print_statistics(&stats),
        None => println!("No runs recorded yet."),
    }
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let report = run_crawl(config).await.context("Crawl failed")?;

    write_report(&report, &config.output, config_hash).context("Failed to write report")?;
    print_statistics(&report.stats);

    let notifier = WebhookNotifier::new(
        build_http_client(&config.user_agent, config.crawler.request_timeout())
            .context("Failed to build notification client")?,
    );
    notify_if_needed(&notifier, &report, &config.notify.destinations).await;

    if report.has_broken_links() {
        tracing::warn!("Found {} broken links", report.broken.len());
    } else {
        tracing::info!("No broken links found");
    }
    Ok(())
}
