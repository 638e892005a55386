//! Singles-Scout main entry point
//!
//! This is the command-line interface for the Singles-Scout catalog scraper.

use anyhow::{bail, Context};
use clap::Parser;
use singles_scout::config::{load_config_with_hash, Config, StoreEntry};
use singles_scout::output::merge_catalogs;
use singles_scout::paginator::run_store;
use singles_scout::prompt::{StartPagePrompt, DEFAULT_START_PAGE};
use singles_scout::shutdown::{self, Shutdown};
use singles_scout::StopReason;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Singles-Scout: an ordered, concurrent MTG singles catalog scraper
///
/// Singles-Scout walks a store's paginated product listing several pages at
/// a time and writes the products to CSV in page order, saving a checkpoint
/// every few pages.
#[derive(Parser, Debug)]
#[command(name = "singles-scout")]
#[command(version = "1.0.0")]
#[command(about = "An ordered, concurrent MTG singles catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Store to scrape (all configured stores when omitted)
    #[arg(value_name = "STORE")]
    store: Option<String>,

    /// Page to start from; skips the interactive prompt
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    start_page: Option<u32>,

    /// Start from page 1 without asking
    #[arg(long, conflicts_with = "start_page")]
    no_prompt: bool,

    /// Merge the existing catalogs into one unified CSV and exit
    #[arg(long, conflicts_with_all = ["dry_run", "store", "start_page"])]
    merge: bool,

    /// Validate config and show what would be scraped without fetching anything
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

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    let stores = select_stores(&config, cli.store.as_deref())?;

    if cli.merge {
        handle_merge(&config)
    } else if cli.dry_run {
        handle_dry_run(&config, &stores);
        Ok(())
    } else {
        let shutdown = shutdown::on_ctrl_c();
        handle_scrape(&config, &stores, &cli, &shutdown).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("singles_scout=info,warn"),
            1 => EnvFilter::new("singles_scout=debug,info"),
            2 => EnvFilter::new("singles_scout=trace,debug"),
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

fn select_stores<'a>(config: &'a Config, name: Option<&str>) -> anyhow::Result<Vec<&'a StoreEntry>> {
    match name {
        Some(name) => match config.store(name) {
            Some(store) => Ok(vec![store]),
            None => {
                let known: Vec<&str> = config.stores.iter().map(|s| s.name.as_str()).collect();
                bail!(
                    "{} (configured: {})",
                    singles_scout::ScoutError::UnknownStore(name.to_string()),
                    known.join(", ")
                )
            }
        },
        None => Ok(config.stores.iter().collect()),
    }
}

/// Handles the --dry-run mode: shows what would be scraped
fn handle_dry_run(config: &Config, stores: &[&StoreEntry]) {
    println!("=== Singles-Scout Dry Run ===\n");

    println!("Paginator:");
    println!("  Window size: {}", config.paginator.window_size);
    println!("  Pages per save: {}", config.paginator.pages_per_save);
    println!(
        "  Stop after empty pages: {}",
        config.paginator.max_consecutive_empty
    );
    println!("  Page ceiling: {}", config.paginator.max_page);

    println!("\nRetry:");
    println!(
        "  {} attempts x {} cycles ({}s between attempts, {}s between cycles)",
        config.retry.attempts_per_cycle,
        config.retry.max_cycles,
        config.retry.retry_wait_secs,
        config.retry.cycle_cooldown_secs
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  Mode: {:?}", config.output.mode);
    println!("  Merge prefix: {}", config.output.merge_prefix);

    println!("\nStores ({}):", stores.len());
    for store in stores {
        println!("  - {} ({:?})", store.name, store.platform);
        println!("    * {}", store.listing_url);
        println!("    * {}_*.csv", store.file_prefix);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --merge mode: writes the unified catalog
fn handle_merge(config: &Config) -> anyhow::Result<()> {
    let directory = Path::new(&config.output.directory);
    let summary = merge_catalogs(directory, &config.output.merge_prefix)
        .with_context(|| format!("Failed to merge catalogs in {}", directory.display()))?;

    if summary.sources.is_empty() {
        tracing::warn!(
            "No '{}*.csv' files found in {}",
            config.output.merge_prefix,
            directory.display()
        );
    }
    println!(
        "✓ Merged {} rows from {} files into {}",
        summary.records,
        summary.sources.len(),
        summary.output.display()
    );
    Ok(())
}

/// Handles the scrape operation for each selected store
async fn handle_scrape(
    config: &Config,
    stores: &[&StoreEntry],
    cli: &Cli,
    shutdown: &Shutdown,
) -> anyhow::Result<()> {
    if stores.is_empty() {
        bail!("No stores configured");
    }

    let mut prompt = None;

    for store in stores {
        if shutdown.is_triggered() {
            tracing::warn!("Interrupted, skipping remaining stores");
            break;
        }

        let start_page = match (cli.start_page, cli.no_prompt) {
            (Some(page), _) => page,
            (None, true) => DEFAULT_START_PAGE,
            (None, false) => {
                println!("Store: {}", store.name);
                let prompt = prompt.get_or_insert_with(|| {
                    let timeout = Duration::from_secs(config.paginator.prompt_timeout_secs);
                    StartPagePrompt::from_stdin(timeout)
                });
                tokio::select! {
                    page = prompt.ask() => page,
                    _ = shutdown.wait() => {
                        println!();
                        tracing::warn!("Interrupted, skipping remaining stores");
                        break;
                    }
                }
            }
        };

        tracing::info!("Scraping {} from page {}", store.name, start_page);
        let summary = run_store(config, store, start_page, shutdown)
            .await
            .with_context(|| format!("Scrape of {} failed", store.name))?;

        println!(
            "{}: {} ({} pages, {} items, {} empty, {} omitted)",
            store.name,
            summary.stop_reason,
            summary.pages_released,
            summary.items_written,
            summary.empty_pages,
            summary.omitted_pages
        );
        if let Some(path) = &summary.output {
            println!("  -> {}", path.display());
        }

        if summary.stop_reason == StopReason::Interrupted {
            tracing::warn!("Interrupted, skipping remaining stores");
            break;
        }
    }

    Ok(())
}
