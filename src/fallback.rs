//! Operator-supplied PMID lists for searches the site refuses to serve.
//!
//! When a search URL is over the length limit or answered with HTTP 414, the
//! crawler asks a [`FallbackInput`] for a text blob (typically the pasted
//! `log_displayeduids` meta content) and extracts the PMIDs from it.

use crate::error::{CrawlError, Result};
use crate::extract::extract_integer_tokens;
use crate::models::SearchQuery;
use async_trait::async_trait;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;

/// Source of externally supplied search results
#[async_trait]
pub trait FallbackInput: Send + Sync {
    /// Raw text containing the PMIDs for `query`
    async fn read_blob(&self, query: &SearchQuery, search_url: &str) -> Result<String>;
}

/// PMIDs from the fallback source, using the same digit-run rule as the meta tag
pub async fn fallback_identifiers(
    input: &dyn FallbackInput,
    query: &SearchQuery,
    search_url: &str,
) -> Result<Vec<String>> {
    let blob = input.read_blob(query, search_url).await?;
    extract_integer_tokens(&blob)
}

/// Prompt on the terminal and read one pasted line
#[derive(Debug, Default)]
pub struct StdinInput;

#[async_trait]
impl FallbackInput for StdinInput {
    async fn read_blob(&self, query: &SearchQuery, search_url: &str) -> Result<String> {
        let topic = query.custom_topic.clone();
        let url = search_url.to_string();

        tokio::task::spawn_blocking(move || -> Result<String> {
            let mut stdout = io::stdout();
            writeln!(stdout, "Search URL is too long for automatic fetching ({}):", topic)?;
            writeln!(stdout, "{}", url)?;
            writeln!(
                stdout,
                "Paste the log_displayeduids meta tag content, then an empty line:"
            )?;
            stdout.flush()?;

            Ok(read_pasted_block(io::stdin().lock())?)
        })
        .await
        .map_err(|e| CrawlError::Input(format!("stdin reader panicked: {}", e)))?
    }
}

/// Lines up to the first blank line or EOF, joined with newlines
fn read_pasted_block(reader: impl BufRead) -> io::Result<String> {
    let mut block = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            break;
        }
        block.push(line);
    }
    Ok(block.join("\n"))
}

/// Read pasted results from disk.
///
/// A directory is searched for `<row>.txt`; a plain file is used for every query.
#[derive(Debug, Clone)]
pub struct FileInput {
    path: PathBuf,
}

impl FileInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FallbackInput for FileInput {
    async fn read_blob(&self, query: &SearchQuery, _search_url: &str) -> Result<String> {
        let path = if tokio::fs::metadata(&self.path).await?.is_dir() {
            self.path.join(format!("{}.txt", query.row))
        } else {
            self.path.clone()
        };

        info!(row = query.row, path = %path.display(), "Reading fallback PMIDs from file");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| CrawlError::Input(format!("{}: {}", path.display(), e)))
    }
}

/// Fixed blob, for dry runs and tests
#[derive(Debug, Clone, Default)]
pub struct StaticInput(pub String);

#[async_trait]
impl FallbackInput for StaticInput {
    async fn read_blob(&self, _query: &SearchQuery, _search_url: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}
