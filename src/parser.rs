//! PubMed article detail page parsing.
//!
//! Every field is looked up independently by its marker element. A missing
//! marker degrades that field to a placeholder; the record is still emitted.

use crate::classify::classify;
use crate::error::{CrawlError, Result};
use crate::models::ArticleRecord;
use chrono::Month;
use scraper::{ElementRef, Html, Selector};

pub const TITLE_NOT_FOUND: &str = "title not found";
pub const ABSTRACT_NOT_FOUND: &str = "abstract not found";
pub const JOURNAL_NOT_FOUND: &str = "journal not found";
pub const CITATION_NOT_FOUND: &str = "citation not found";
pub const DOI_NOT_FOUND: &str = "DOI not found";
pub const EPUB_NOT_FOUND: &str = "epub date not found";

/// Sentinel for publication dates that cannot be normalized
pub const INVALID_DATE: &str = "invalid date";

/// Marker selectors on the detail page
struct Markers {
    title: Selector,
    abstract_block: Selector,
    journal: Selector,
    citation: Selector,
    doi: Selector,
    epub: Selector,
}

impl Markers {
    fn new() -> Result<Self> {
        let parse = |css: &str| Selector::parse(css).map_err(|e| CrawlError::Parse(e.to_string()));
        Ok(Self {
            title: parse("h1.heading-title")?,
            abstract_block: parse("div#abstract")?,
            journal: parse("button.journal-actions-trigger.trigger")?,
            citation: parse("span.cit")?,
            doi: parse("span.citation-doi")?,
            epub: parse("span.secondary-date")?,
        })
    }
}

/// Parse one fetched detail page into an [`ArticleRecord`].
pub fn parse_detail_page(
    html: &str,
    identifier: &str,
    detail_url: &str,
    topic: &str,
) -> Result<ArticleRecord> {
    let document = Html::parse_document(html);
    let markers = Markers::new()?;
    let first = |selector: &Selector| document.select(selector).next();

    let title = first(&markers.title)
        .map(collapsed_text)
        .unwrap_or_else(|| TITLE_NOT_FOUND.to_string());

    let abstract_text = first(&markers.abstract_block)
        .map(abstract_text)
        .unwrap_or_else(|| ABSTRACT_NOT_FOUND.to_string());

    let journal_name = first(&markers.journal)
        .map(collapsed_text)
        .unwrap_or_else(|| JOURNAL_NOT_FOUND.to_string());

    let citation_info = first(&markers.citation)
        .map(collapsed_text)
        .unwrap_or_else(|| CITATION_NOT_FOUND.to_string());

    let raw_pub_date = citation_pub_date(&citation_info);
    let normalized_pub_date = format_pub_date(&raw_pub_date);

    let doi = first(&markers.doi)
        .map(|el| strip_label(&collapsed_text(el), "doi:"))
        .unwrap_or_else(|| DOI_NOT_FOUND.to_string());

    let epub_date = first(&markers.epub)
        .map(|el| strip_label(&collapsed_text(el), "Epub"))
        .unwrap_or_else(|| EPUB_NOT_FOUND.to_string());

    let article_type = classify(&title, &abstract_text);

    Ok(ArticleRecord {
        title,
        abstract_text,
        article_type,
        journal_name,
        raw_pub_date,
        normalized_pub_date,
        citation_info,
        doi,
        epub_date,
        detail_url: detail_url.to_string(),
        identifier: identifier.to_string(),
        topic: topic.to_string(),
    })
}

/// Element text with runs of whitespace collapsed to single spaces
fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Abstract text fragments, trimmed, one per line, minus the "Abstract" heading
fn abstract_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter(|fragment| !fragment.eq_ignore_ascii_case("abstract"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_label(text: &str, label: &str) -> String {
    text.replace(label, "").trim().to_string()
}

/// Publication date part of a citation: everything before the first `;`
pub fn citation_pub_date(citation: &str) -> String {
    match citation.split_once(';') {
        Some((date, _)) => date.trim().to_string(),
        None => citation.to_string(),
    }
}

/// Normalize a PubMed citation date (`2020 Jan-Feb 15`) to `YYYY/MM/DD`.
///
/// The day defaults to `01`. Anything unparseable yields [`INVALID_DATE`].
pub fn format_pub_date(pub_date: &str) -> String {
    try_format_pub_date(pub_date).unwrap_or_else(|| INVALID_DATE.to_string())
}

fn try_format_pub_date(pub_date: &str) -> Option<String> {
    let mut parts = pub_date.split_whitespace();
    let year = parts.next()?;
    let month_token = parts.next()?.split('-').next()?;
    let abbrev: String = month_token.chars().take(3).collect();
    if abbrev.chars().count() < 3 {
        return None;
    }
    let month = abbrev.parse::<Month>().ok()?.number_from_month();
    let day = match parts.next() {
        Some(day) => day.parse::<u32>().ok()?,
        None => 1,
    };

    Some(format!("{}/{:02}/{:02}", year, month, day))
}
