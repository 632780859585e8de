//! Row-level data model shared by the crawler and the store adapters.
//!
//! The query sheet is the input queue (one [`SearchQuery`] per row) and the
//! literature sheet is the output store (one [`ArticleRecord`] per row).

use crate::classify::ArticleType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Topic used when the query row leaves column B empty
pub const DEFAULT_TOPIC: &str = "untitled topic";

/// Completion marker persisted in column D of the query sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStatus {
    Pending,
    Done,
}

impl QueryStatus {
    /// Parse the raw status cell; anything other than `DONE` is pending.
    pub fn from_cell(cell: &str) -> Self {
        if cell == "DONE" {
            QueryStatus::Done
        } else {
            QueryStatus::Pending
        }
    }

    /// Cell value written back to the sheet
    pub fn as_cell(&self) -> &'static str {
        match self {
            QueryStatus::Pending => "",
            QueryStatus::Done => "DONE",
        }
    }
}

/// Filter override from column E
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSpec {
    /// Empty cell: use the default publication-type filters
    Default,
    /// Literal `none`: no filters at all
    None,
    /// Comma-separated explicit filters
    Custom(Vec<String>),
}

impl FilterSpec {
    pub fn from_cell(cell: Option<&str>) -> Self {
        let raw = cell.map(str::trim).unwrap_or("");
        if raw.is_empty() {
            FilterSpec::Default
        } else if raw.eq_ignore_ascii_case("none") {
            FilterSpec::None
        } else {
            FilterSpec::Custom(raw.split(',').map(|f| f.trim().to_string()).collect())
        }
    }
}

/// One row of the query sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// 1-based sheet row the query was read from
    pub row: usize,
    pub raw_term: String,
    pub custom_topic: String,
    pub status: QueryStatus,
    pub filter_spec: FilterSpec,
}

impl SearchQuery {
    /// Build a query from a raw `A:E` row.
    ///
    /// Returns `None` for rows without a search term column.
    pub fn from_row(row: usize, cells: &[String]) -> Option<Self> {
        let raw_term = cells.first()?.clone();
        let custom_topic = cells
            .get(1)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TOPIC.to_string());
        let status = QueryStatus::from_cell(cells.get(3).map(String::as_str).unwrap_or(""));
        let filter_spec = FilterSpec::from_cell(cells.get(4).map(String::as_str));

        Some(Self {
            row,
            raw_term,
            custom_topic,
            status,
            filter_spec,
        })
    }
}

/// Identifiers extracted for one query, before deduplication
#[derive(Debug, Clone)]
pub struct SearchResultSet {
    pub identifiers: Vec<String>,
    pub source_query: SearchQuery,
}

/// A parsed article ready to be appended to the literature sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub abstract_text: String,
    pub article_type: ArticleType,
    pub journal_name: String,
    pub raw_pub_date: String,
    pub normalized_pub_date: String,
    pub citation_info: String,
    pub doi: String,
    pub epub_date: String,
    pub detail_url: String,
    pub identifier: String,
    pub topic: String,
}

impl ArticleRecord {
    /// Cells in target-sheet column order (A..L)
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            self.abstract_text.clone(),
            self.article_type.to_string(),
            self.journal_name.clone(),
            self.raw_pub_date.clone(),
            self.normalized_pub_date.clone(),
            self.citation_info.clone(),
            self.doi.clone(),
            self.epub_date.clone(),
            self.detail_url.clone(),
            self.identifier.clone(),
            self.topic.clone(),
        ]
    }
}

impl fmt::Display for ArticleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PMID {} ({})", self.identifier, self.article_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_query_from_short_row() {
        let query = SearchQuery::from_row(2, &cells(&["diabetes"])).expect("query");
        assert_eq!(query.custom_topic, DEFAULT_TOPIC);
        assert_eq!(query.status, QueryStatus::Pending);
        assert_eq!(query.filter_spec, FilterSpec::Default);
    }

    #[test]
    fn test_query_from_full_row() {
        let query = SearchQuery::from_row(
            5,
            &cells(&["statins", "Lipids", "12", "DONE", " pubt.review , pubt.books "]),
        )
        .expect("query");
        assert_eq!(query.row, 5);
        assert_eq!(query.status, QueryStatus::Done);
        assert_eq!(
            query.filter_spec,
            FilterSpec::Custom(vec!["pubt.review".to_string(), "pubt.books".to_string()])
        );
    }

    #[test]
    fn test_empty_row_is_skipped() {
        assert!(SearchQuery::from_row(3, &[]).is_none());
    }

    #[test]
    fn test_filter_none_is_case_insensitive() {
        assert_eq!(FilterSpec::from_cell(Some(" NONE ")), FilterSpec::None);
        assert_eq!(FilterSpec::from_cell(Some("   ")), FilterSpec::Default);
        assert_eq!(FilterSpec::from_cell(None), FilterSpec::Default);
    }

    #[test]
    fn test_record_row_order() {
        let record = ArticleRecord {
            title: "t".into(),
            abstract_text: "a".into(),
            article_type: ArticleType::Review,
            journal_name: "j".into(),
            raw_pub_date: "2020 Jan".into(),
            normalized_pub_date: "2020/01/01".into(),
            citation_info: "2020 Jan;1(2):3".into(),
            doi: "10.1/x".into(),
            epub_date: "2019 Dec 1".into(),
            detail_url: "https://pubmed.ncbi.nlm.nih.gov/1/".into(),
            identifier: "1".into(),
            topic: "topic".into(),
        };
        let row = record.to_row();
        assert_eq!(row.len(), 12);
        assert_eq!(row[2], "Review");
        assert_eq!(row[10], "1");
        assert_eq!(row[11], "topic");
    }
}
