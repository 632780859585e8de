//! # rustpubmed
//!
//! PubMed literature crawler driven by a spreadsheet.
//!
//! ## Modules
//!
//! - [`query`] - Search URL construction
//! - [`extract`] - PMID extraction from search pages
//! - [`fallback`] - Operator-supplied PMID lists for oversized searches
//! - [`parser`] - Detail page parsing and date normalization
//! - [`classify`] - Article type classification
//! - [`dedup`] - Filtering against already stored PMIDs
//! - [`crawler`] - The per-query crawl loop
//! - [`store`] - Spreadsheet backends and sheet operations
//! - [`summarize`] - LLM key-point summaries
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustpubmed::crawler::{CrawlOptions, Crawler};
//! use rustpubmed::fallback::StdinInput;
//! use rustpubmed::pubmed::{PubMedClient, DEFAULT_PUBMED_URL};
//! use rustpubmed::query::SearchUrlBuilder;
//! use rustpubmed::store::{CsvStore, Workbook};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(CsvStore::new("./sheets")?);
//!     let crawler = Crawler::new(
//!         PubMedClient::new(DEFAULT_PUBMED_URL, 2)?,
//!         Workbook::with_default_sheets(store),
//!         Arc::new(StdinInput),
//!         SearchUrlBuilder::default(),
//!         CrawlOptions::default(),
//!     );
//!     let report = crawler.run().await?;
//!     println!("Wrote {} articles", report.records_written);
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod models;
pub mod parser;
pub mod prompts;
pub mod pubmed;
pub mod query;
pub mod store;
pub mod summarize;

pub use error::{CrawlError, Result};
