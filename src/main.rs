//! Catalog-Relations main entry point
//!
//! This is the command-line interface for the Catalog-Relations crawler.

use anyhow::Context;
use catalog_relations::catalog::ItemId;
use catalog_relations::config::{load_config_with_hash, Config};
use catalog_relations::crawler::crawl;
use catalog_relations::output::{
    compute_statistics, generate_summary, print_statistics, report_writers, write_reports,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Relations: maps how catalog items reference each other
///
/// Starting from a set of root items, Catalog-Relations follows every item id
/// embedded in each item's data, records every related item with the path
/// that reached it, and exports the result as CSV tables, a markdown summary
/// and a network graph.
#[derive(Parser, Debug)]
#[command(name = "catalog-relations")]
#[command(version = "1.0.0")]
#[command(about = "Maps relationships between portal catalog items", long_about = None)]
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
    #[arg(long)]
    dry_run: bool,

    /// Crawl these root items instead of the configured or searched ones
    #[arg(long = "root", value_name = "ID", value_parser = parse_item_id)]
    roots: Vec<ItemId>,

    /// Skip the network graph even if a graph path is configured
    #[arg(long)]
    no_graph: bool,
}

fn parse_item_id(raw: &str) -> Result<ItemId, String> {
    ItemId::parse(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli.roots)
    } else {
        handle_crawl(&config, &config_hash, cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_relations=info,warn"),
            1 => EnvFilter::new("catalog_relations=debug,info"),
            2 => EnvFilter::new("catalog_relations=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, overrides: &[ItemId]) -> anyhow::Result<()> {
    println!("=== Catalog-Relations Dry Run ===\n");

    println!("Portal:");
    println!("  URL: {}", config.portal.url);
    println!(
        "  Token: {}",
        if config.portal.token.is_some() { "configured" } else { "none (public items only)" }
    );

    println!("\nCrawler Configuration:");
    println!("  Fetch attempts: {}", config.crawler.fetch_attempts);
    println!("  Retry delay: {}ms", config.crawler.retry_delay_ms);
    println!("  Concurrent roots: {}", config.crawler.max_concurrent_roots);
    if let Some(limit) = config.crawler.max_root_items {
        println!("  Root limit: {}", limit);
    }

    println!("\nOutput:");
    println!("  Related items: {}", config.output.related_items_path);
    println!("  Missed items: {}", config.output.missed_items_path);
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }
    if let Some(path) = &config.output.graph_path {
        println!("  Graph: {}", path);
    }

    let configured = config.search.root_ids()?;
    let roots = if overrides.is_empty() { &configured[..] } else { overrides };

    if roots.is_empty() {
        println!("\nRoot Search:");
        println!(
            "  Owner: {}",
            config.search.owner.as_deref().unwrap_or("(token user)")
        );
        println!("  Created since: {} (epoch ms)", config.search.start_date);
        if let Some(limit) = config.search.max_found_items {
            println!("  Result limit: {}", limit);
        }
        println!("\n✓ Configuration is valid");
        println!("✓ Would search the portal for root items");
    } else {
        println!("\nRoot Items ({}):", roots.len());
        for id in roots {
            println!("  - {}", id);
        }
        println!("\n✓ Configuration is valid");
        println!("✓ Would start crawling with {} root items", roots.len());
    }

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, cli: Cli) -> anyhow::Result<()> {
    let report = match crawl(config, cli.roots).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let summary = generate_summary(&report, config_hash, &config.portal.url);
    let writers = report_writers(&config.output, &config.portal.url, !cli.no_graph);
    write_reports(&writers, &report, &summary).context("failed to write reports")?;

    if !cli.quiet {
        print_statistics(&compute_statistics(&report));
    }

    tracing::info!("Crawl completed successfully");
    Ok(())
}
