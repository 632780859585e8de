//! Per-query crawl loop.
//!
//! For every pending row of the query sheet: build the search URL, collect
//! PMIDs (search page or operator fallback), drop the ones already stored,
//! fetch and parse each new detail page, append the batch, then mark the row
//! `DONE`. A failure inside one query never stops the run; the row keeps its
//! status and is picked up again next time.

use crate::dedup::KnownIdentifiers;
use crate::error::Result;
use crate::extract::extract_identifiers;
use crate::fallback::{fallback_identifiers, FallbackInput};
use crate::models::{ArticleRecord, QueryStatus, SearchQuery, SearchResultSet};
use crate::parser::parse_detail_page;
use crate::pubmed::{PubMedClient, SearchPage};
use crate::query::{resolve_filters, SearchUrlBuilder, DEFAULT_PAGE_SIZE, MAX_URL_LENGTH};
use crate::store::workbook::APPEND_COLUMN;
use crate::store::Workbook;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Tuning knobs for a crawl run
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Results requested per search page
    pub page_size: usize,
    /// Detail pages fetched in parallel within one query
    pub concurrency: usize,
    /// Longest search URL attempted over HTTP
    pub max_url_length: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            concurrency: 1,
            max_url_length: MAX_URL_LENGTH,
        }
    }
}

/// What happened to one query row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Already `DONE` before this run
    Skipped,
    /// Marked `DONE` in this run
    Done {
        /// PMIDs extracted from the search
        found: usize,
        /// PMIDs not yet in the store
        new: usize,
        /// Rows appended to the literature sheet
        written: usize,
        /// New PMIDs whose detail page could not be fetched
        failed: usize,
    },
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub queries_done: usize,
    pub queries_skipped: usize,
    pub queries_failed: usize,
    pub records_written: usize,
    pub fetch_failures: usize,
}

/// Drives the query sheet through search, dedup, fetch and persist
pub struct Crawler {
    client: PubMedClient,
    workbook: Workbook,
    fallback: Arc<dyn FallbackInput>,
    urls: SearchUrlBuilder,
    options: CrawlOptions,
}

impl Crawler {
    pub fn new(
        client: PubMedClient,
        workbook: Workbook,
        fallback: Arc<dyn FallbackInput>,
        urls: SearchUrlBuilder,
        options: CrawlOptions,
    ) -> Self {
        Self {
            client,
            workbook,
            fallback,
            urls,
            options,
        }
    }

    /// Process every query row once.
    ///
    /// Only failing to load the queries or the existing PMIDs is fatal.
    pub async fn run(&self) -> Result<CrawlReport> {
        let queries = self.workbook.read_search_queries().await?;
        let mut known = self.workbook.read_existing_identifiers().await?;
        let mut report = CrawlReport::default();

        for query in &queries {
            if query.status == QueryStatus::Done {
                info!(row = query.row, topic = %query.custom_topic, "Skipping completed query");
                report.queries_skipped += 1;
                continue;
            }

            match self.process_query(query, &mut known).await {
                Ok(QueryOutcome::Done { written, failed, .. }) => {
                    report.queries_done += 1;
                    report.records_written += written;
                    report.fetch_failures += failed;
                }
                Ok(QueryOutcome::Skipped) => report.queries_skipped += 1,
                Err(e) => {
                    error!(
                        row = query.row,
                        topic = %query.custom_topic,
                        error = %e,
                        "Query failed, status left unchanged for retry"
                    );
                    report.queries_failed += 1;
                }
            }
        }

        info!(
            done = report.queries_done,
            skipped = report.queries_skipped,
            failed = report.queries_failed,
            written = report.records_written,
            "Crawl complete"
        );
        Ok(report)
    }

    /// Run one query row to completion.
    ///
    /// `known` grows by the PMIDs written, so later queries see them.
    pub async fn process_query(
        &self,
        query: &SearchQuery,
        known: &mut KnownIdentifiers,
    ) -> Result<QueryOutcome> {
        if query.status == QueryStatus::Done {
            return Ok(QueryOutcome::Skipped);
        }

        let result_set = self.search(query).await?;
        let found = result_set.identifiers.len();
        let new_ids = unique_in_order(known.filter_new(&result_set.identifiers));
        let source = &result_set.source_query;
        info!(
            row = source.row,
            topic = %source.custom_topic,
            found = found,
            new = new_ids.len(),
            "PMIDs extracted"
        );

        self.workbook.update_query_status(query.row, found, None).await?;

        let records = self.fetch_records(&new_ids, &query.custom_topic).await;
        let failed = new_ids.len() - records.len();

        if !records.is_empty() {
            let start_row = self.workbook.find_first_empty_row(APPEND_COLUMN).await?;
            self.workbook.write_records(&records, start_row).await?;
            known.extend(records.iter().map(|r| r.identifier.clone()));
        }

        self.workbook
            .update_query_status(query.row, found, Some(QueryStatus::Done))
            .await?;

        Ok(QueryOutcome::Done {
            found,
            new: new_ids.len(),
            written: records.len(),
            failed,
        })
    }

    /// Collect PMIDs for a query, falling back to operator input for oversized searches
    async fn search(&self, query: &SearchQuery) -> Result<SearchResultSet> {
        let filters = resolve_filters(&query.filter_spec);
        let url = self
            .urls
            .build(&query.raw_term, &filters, self.options.page_size);

        let identifiers = if url.len() > self.options.max_url_length {
            warn!(row = query.row, length = url.len(), "Search URL too long, using fallback input");
            fallback_identifiers(self.fallback.as_ref(), query, &url).await?
        } else {
            match self.client.fetch_search_page(&url).await? {
                SearchPage::Markup(html) => extract_identifiers(&html)?,
                SearchPage::UriTooLong => {
                    warn!(row = query.row, "Search rejected with 414, using fallback input");
                    fallback_identifiers(self.fallback.as_ref(), query, &url).await?
                }
            }
        };

        Ok(SearchResultSet {
            identifiers,
            source_query: query.clone(),
        })
    }

    /// Fetch and parse detail pages, keeping submission order and dropping failures
    async fn fetch_records(&self, pmids: &[String], topic: &str) -> Vec<ArticleRecord> {
        let fetched: Vec<Option<ArticleRecord>> = stream::iter(pmids)
            .map(|pmid| async move {
                match self.fetch_record(pmid, topic).await {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!(pmid = %pmid, error = %e, "Failed to fetch article");
                        None
                    }
                }
            })
            .buffered(self.options.concurrency.max(1))
            .collect()
            .await;

        fetched.into_iter().flatten().collect()
    }

    async fn fetch_record(&self, pmid: &str, topic: &str) -> Result<ArticleRecord> {
        let html = self.client.fetch_detail_page(pmid).await?;
        parse_detail_page(&html, pmid, &self.client.detail_url(pmid), topic)
    }
}

/// Drop repeated PMIDs so one search never appends the same article twice
fn unique_in_order(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}
