//! rustpubmed - PubMed literature crawler
//!
//! Reads search queries from a spreadsheet, collects the matching PubMed
//! articles into a second sheet, and optionally writes LLM key-point summaries.
//!
//! ## Usage
//!
//! ### Crawl pending queries
//! ```bash
//! rustpubmed crawl --backend sheets
//! rustpubmed crawl --backend csv --dir ./sheets --fallback-file ./pasted
//! ```
//!
//! ### Summarize stored abstracts
//! ```bash
//! rustpubmed summarize
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rustpubmed::config::Config;
use rustpubmed::crawler::{CrawlOptions, Crawler};
use rustpubmed::fallback::{FallbackInput, FileInput, StdinInput};
use rustpubmed::models::FilterSpec;
use rustpubmed::pubmed::PubMedClient;
use rustpubmed::query::{resolve_filters, SearchUrlBuilder, DEFAULT_PAGE_SIZE};
use rustpubmed::store::{CsvStore, SheetsStore, TabularStore, Workbook};
use rustpubmed::summarize::{summarize_sheet, ChatSummarizer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// PubMed literature crawler
#[derive(Parser)]
#[command(name = "rustpubmed")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl every pending query row into the literature sheet
    Crawl {
        #[command(flatten)]
        store: StoreArgs,

        /// Read fallback PMIDs from this file (or `<dir>/<row>.txt`) instead of the terminal
        #[arg(long)]
        fallback_file: Option<PathBuf>,

        /// Detail pages fetched in parallel (default: CRAWL_CONCURRENCY or 1)
        #[arg(long)]
        concurrency: Option<usize>,

        /// Results requested per search page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },

    /// Generate key-point summaries for rows without one
    Summarize {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Print the search URL a query row would produce
    Url {
        /// Search term
        term: String,

        /// Comma-separated filters, `none`, or omit for the defaults
        #[arg(long)]
        filters: Option<String>,

        /// Results requested per search page
        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        page_size: usize,
    },
}

#[derive(Args)]
struct StoreArgs {
    /// Storage backend
    #[arg(long, default_value = "sheets", value_parser = ["sheets", "csv"])]
    backend: String,

    /// Directory holding `<sheet>.csv` files (csv backend)
    #[arg(long, default_value = "./sheets")]
    dir: PathBuf,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.json {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .init();
    }

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("Failed to load .env");
        }
    }
    let config = Config::from_env();

    match cli.command {
        Commands::Crawl {
            store,
            fallback_file,
            concurrency,
            page_size,
        } => run_crawl(&config, &store, fallback_file, concurrency, page_size).await,
        Commands::Summarize { store } => run_summarize(&config, &store).await,
        Commands::Url {
            term,
            filters,
            page_size,
        } => {
            let spec = FilterSpec::from_cell(filters.as_deref());
            let url = SearchUrlBuilder::new(config.search_base_url())
                .build(&term, &resolve_filters(&spec), page_size);
            println!("{}", url);
            Ok(())
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

fn open_workbook(config: &Config, args: &StoreArgs) -> Result<Workbook> {
    let store: Arc<dyn TabularStore> = match args.backend.as_str() {
        "csv" => {
            info!(dir = %args.dir.display(), "Using CSV store");
            Arc::new(CsvStore::new(args.dir.clone()).context("Failed to open CSV store")?)
        }
        _ => {
            let (spreadsheet_id, token) = config.sheets_credentials()?;
            info!(spreadsheet = %spreadsheet_id, "Using Google Sheets store");
            Arc::new(SheetsStore::new(spreadsheet_id, token)?)
        }
    };

    Ok(Workbook::new(
        store,
        config.source_sheet.clone(),
        config.target_sheet.clone(),
    ))
}

async fn run_crawl(
    config: &Config,
    store: &StoreArgs,
    fallback_file: Option<PathBuf>,
    concurrency: Option<usize>,
    page_size: usize,
) -> Result<()> {
    let workbook = open_workbook(config, store)?;
    let fallback: Arc<dyn FallbackInput> = match fallback_file {
        Some(path) => Arc::new(FileInput::new(path)),
        None => Arc::new(StdinInput),
    };

    let options = CrawlOptions {
        page_size,
        concurrency: concurrency.unwrap_or(config.concurrency),
        ..Default::default()
    };

    let crawler = Crawler::new(
        PubMedClient::new(config.pubmed_url.clone(), config.max_retries)?,
        workbook,
        fallback,
        SearchUrlBuilder::new(config.search_base_url()),
        options,
    );

    let report = crawler.run().await.context("Crawl aborted")?;

    println!(
        "\n✓ Crawl complete: {} queries done, {} skipped, {} failed, {} articles written ({} fetch failures)",
        report.queries_done,
        report.queries_skipped,
        report.queries_failed,
        report.records_written,
        report.fetch_failures
    );
    Ok(())
}

async fn run_summarize(config: &Config, store: &StoreArgs) -> Result<()> {
    let workbook = open_workbook(config, store)?;
    let summarizer = ChatSummarizer::new(config.llm_config()?)?;

    let report = summarize_sheet(&workbook, &summarizer)
        .await
        .context("Summary pass aborted")?;

    println!(
        "\n✓ Summaries: {} written, {} skipped, {} failed ({} tokens)",
        report.summarized, report.skipped, report.failed, report.usage.total_tokens
    );
    Ok(())
}
