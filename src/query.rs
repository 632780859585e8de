//! PubMed search URL construction.
//!
//! The query string shape is reproduced byte for byte, including the empty
//! filter segment (`term=x&&size=200`) when no filters apply.

use crate::models::FilterSpec;

/// Default PubMed search endpoint; the encoded term is appended directly
pub const DEFAULT_SEARCH_BASE: &str = "https://pubmed.ncbi.nlm.nih.gov/?term=";

/// Results requested per search page
pub const DEFAULT_PAGE_SIZE: usize = 200;

/// Longest search URL sent over the wire; longer ones go to manual fallback
pub const MAX_URL_LENGTH: usize = 2000;

/// Publication-type filters applied when a query row leaves column E empty
pub const DEFAULT_FILTERS: &[&str] = &[
    "pubt.meta-analysis",
    "pubt.randomizedcontrolledtrial",
    "pubt.systematicreview",
];

/// Builds search URLs against a (possibly mocked) PubMed front end
#[derive(Debug, Clone)]
pub struct SearchUrlBuilder {
    base_url: String,
}

impl SearchUrlBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Build the search URL for a raw term.
    pub fn build(&self, term: &str, filters: &[String], page_size: usize) -> String {
        let encoded_term = encode(&clean_term(term));
        let filter_params = filters
            .iter()
            .map(|f| format!("filter={}", encode(f)))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}{}&{}&size={}",
            self.base_url, encoded_term, filter_params, page_size
        )
    }
}

impl Default for SearchUrlBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_BASE)
    }
}

/// Strip line breaks pasted along with the term, then surrounding whitespace
pub fn clean_term(term: &str) -> String {
    term.replace('\n', "").trim().to_string()
}

/// Filters to apply for a query row
pub fn resolve_filters(spec: &FilterSpec) -> Vec<String> {
    match spec {
        FilterSpec::Default => DEFAULT_FILTERS.iter().map(|f| f.to_string()).collect(),
        FilterSpec::None => Vec::new(),
        FilterSpec::Custom(filters) => filters.clone(),
    }
}

/// Percent-encode everything except unreserved characters and `/`
fn encode(raw: &str) -> String {
    urlencoding::encode(raw).replace("%2F", "/")
}
