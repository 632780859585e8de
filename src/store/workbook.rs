//! Query-sheet and literature-sheet operations over any [`TabularStore`].
//!
//! Query sheet columns: A=term, B=topic, C=PMID count, D=status, E=filters.
//! Literature sheet columns: A..L as in [`ArticleRecord::to_row`], N=summary.

use super::TabularStore;
use crate::dedup::KnownIdentifiers;
use crate::error::Result;
use crate::models::{ArticleRecord, QueryStatus, SearchQuery};
use std::sync::Arc;
use tracing::{debug, info};

/// Default name of the query sheet
pub const DEFAULT_SOURCE_SHEET: &str = "爬蟲紀錄";

/// Default name of the literature sheet
pub const DEFAULT_TARGET_SHEET: &str = "literature_data";

/// Literature sheet column holding the PMID
pub const IDENTIFIER_COLUMN: &str = "K";

/// Literature sheet column scanned to find the next free row
pub const APPEND_COLUMN: &str = "A";

/// Literature sheet column holding the generated summary (14th)
pub const SUMMARY_COLUMN: usize = 14;

/// One populated literature row, as seen by the summary pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteratureRow {
    pub row: usize,
    pub title: String,
    pub abstract_text: String,
    pub summary: String,
}

/// The two sheets the crawler works against
#[derive(Clone)]
pub struct Workbook {
    store: Arc<dyn TabularStore>,
    source_sheet: String,
    target_sheet: String,
}

impl Workbook {
    pub fn new(
        store: Arc<dyn TabularStore>,
        source_sheet: impl Into<String>,
        target_sheet: impl Into<String>,
    ) -> Self {
        Self {
            store,
            source_sheet: source_sheet.into(),
            target_sheet: target_sheet.into(),
        }
    }

    pub fn with_default_sheets(store: Arc<dyn TabularStore>) -> Self {
        Self::new(store, DEFAULT_SOURCE_SHEET, DEFAULT_TARGET_SHEET)
    }

    /// All query rows below the header, in sheet order
    pub async fn read_search_queries(&self) -> Result<Vec<SearchQuery>> {
        let rows = self.store.read(&self.source_sheet, "A2:E").await?;
        let queries: Vec<SearchQuery> = rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| SearchQuery::from_row(i + 2, cells))
            .collect();

        info!(count = queries.len(), sheet = %self.source_sheet, "Loaded search queries");
        Ok(queries)
    }

    /// PMIDs already present in the literature sheet
    pub async fn read_existing_identifiers(&self) -> Result<KnownIdentifiers> {
        let range = format!("{}2:{}", IDENTIFIER_COLUMN, IDENTIFIER_COLUMN);
        let rows = self.store.read(&self.target_sheet, &range).await?;
        let known: KnownIdentifiers = rows
            .into_iter()
            .filter_map(|row| row.into_iter().next())
            .filter(|id| !id.is_empty())
            .collect();

        info!(count = known.len(), "Loaded existing PMIDs");
        Ok(known)
    }

    /// One past the last populated row of `column` in the literature sheet
    pub async fn find_first_empty_row(&self, column: &str) -> Result<usize> {
        let values = self.store.column_values(&self.target_sheet, column).await?;
        Ok(if values.is_empty() { 2 } else { values.len() + 1 })
    }

    /// Write the PMID count, and the status when given, into C:D of the query row
    pub async fn update_query_status(
        &self,
        row: usize,
        pmid_count: usize,
        status: Option<QueryStatus>,
    ) -> Result<()> {
        let mut cells = vec![pmid_count.to_string()];
        if let Some(status) = status {
            cells.push(status.as_cell().to_string());
        }
        debug!(row = row, count = pmid_count, status = ?status, "Updating query status");
        self.store
            .write(&self.source_sheet, &format!("C{}", row), &[cells])
            .await
    }

    /// Append a batch of records starting at `start_row`
    pub async fn write_records(&self, records: &[ArticleRecord], start_row: usize) -> Result<()> {
        let rows: Vec<Vec<String>> = records.iter().map(ArticleRecord::to_row).collect();
        self.store
            .write(&self.target_sheet, &format!("A{}", start_row), &rows)
            .await?;
        info!(count = rows.len(), start_row = start_row, "Records written");
        Ok(())
    }

    /// Literature rows with their title, abstract and summary cells
    pub async fn read_literature_rows(&self) -> Result<Vec<LiteratureRow>> {
        let rows = self.store.read(&self.target_sheet, "A2:N").await?;
        let cell = |cells: &[String], i: usize| cells.get(i).cloned().unwrap_or_default();

        Ok(rows
            .iter()
            .enumerate()
            .map(|(i, cells)| LiteratureRow {
                row: i + 2,
                title: cell(cells, 0),
                abstract_text: cell(cells, 1),
                summary: cell(cells, SUMMARY_COLUMN - 1),
            })
            .collect())
    }

    pub async fn write_summary(&self, row: usize, summary: &str) -> Result<()> {
        self.store
            .update_cell(&self.target_sheet, row, SUMMARY_COLUMN, summary)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn workbook(store: Arc<MemoryStore>) -> Workbook {
        Workbook::new(store, "queries", "literature")
    }

    #[tokio::test]
    async fn test_read_queries_keeps_row_numbers() -> Result<()> {
        let store = Arc::new(MemoryStore::new().with_sheet(
            "queries",
            vec![
                row(&["term", "topic", "count", "status", "filter"]),
                row(&["a"]),
                row(&[]),
                row(&["c", "C", "3", "DONE"]),
            ],
        ));
        let queries = workbook(store).read_search_queries().await?;
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].row, 2);
        assert_eq!(queries[1].row, 4);
        assert_eq!(queries[1].status, QueryStatus::Done);
        Ok(())
    }

    #[tokio::test]
    async fn test_first_empty_row() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let book = workbook(store.clone());
        assert_eq!(book.find_first_empty_row("A").await?, 2);

        store
            .write("literature", "A1", &[row(&["title"]), row(&["x"]), row(&["y"])])
            .await?;
        assert_eq!(book.find_first_empty_row("A").await?, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_updates() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let book = workbook(store.clone());

        book.update_query_status(3, 7, None).await?;
        assert_eq!(store.read("queries", "C3:D3").await?, vec![row(&["7"])]);

        book.update_query_status(3, 7, Some(QueryStatus::Done)).await?;
        assert_eq!(store.read("queries", "C3:D3").await?, vec![row(&["7", "DONE"])]);
        Ok(())
    }

    #[tokio::test]
    async fn test_existing_identifiers_skip_blanks() -> Result<()> {
        let mut with_id = vec![String::new(); 11];
        with_id[10] = "555".to_string();
        let store = Arc::new(MemoryStore::new().with_sheet(
            "literature",
            vec![row(&["title"]), with_id, row(&["no id"])],
        ));
        let known = workbook(store).read_existing_identifiers().await?;
        assert_eq!(known.len(), 1);
        assert!(known.contains("555"));
        Ok(())
    }

    #[tokio::test]
    async fn test_literature_rows_and_summary() -> Result<()> {
        let store = Arc::new(MemoryStore::new().with_sheet(
            "literature",
            vec![row(&["title", "abstract"]), row(&["T", "A"])],
        ));
        let book = workbook(store.clone());

        let rows = book.read_literature_rows().await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].row, 2);
        assert!(rows[0].summary.is_empty());

        book.write_summary(2, "- point").await?;
        let rows = book.read_literature_rows().await?;
        assert_eq!(rows[0].summary, "- point");
        Ok(())
    }
}
