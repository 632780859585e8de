//! PMID extraction from PubMed search result pages.
//!
//! The search page embeds the displayed result IDs in a
//! `<meta name="log_displayeduids" content="...">` tag. Operator-pasted
//! fallback text goes through the same digit-run matcher.

use crate::error::{CrawlError, Result};
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

/// Meta tag attribute carrying the displayed PMIDs
pub const DISPLAYED_UIDS_META: &str = "log_displayeduids";

/// Extract PMIDs from a search results page.
///
/// A page without the meta tag yields an empty list.
pub fn extract_identifiers(html: &str) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(&format!("meta[name=\"{}\"]", DISPLAYED_UIDS_META))
        .map_err(|e| CrawlError::Parse(e.to_string()))?;

    let Some(meta) = document.select(&selector).next() else {
        debug!("No displayed-uids meta tag on search page");
        return Ok(Vec::new());
    };

    extract_integer_tokens(meta.value().attr("content").unwrap_or(""))
}

/// All standalone digit runs in `text`, in order, duplicates kept.
pub fn extract_integer_tokens(text: &str) -> Result<Vec<String>> {
    let digits = Regex::new(r"\b\d+\b").map_err(|e| CrawlError::Parse(e.to_string()))?;
    Ok(digits
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect())
}
