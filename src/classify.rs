//! Article-type classification from title and abstract keywords.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Publication type label written to column C of the literature sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArticleType {
    SystematicReview,
    MetaAnalysis,
    RandomizedControlledTrial,
    ClinicalTrial,
    BooksAndDocuments,
    Review,
    Unknown,
}

impl ArticleType {
    pub fn label(&self) -> &'static str {
        match self {
            ArticleType::SystematicReview => "Systematic Review",
            ArticleType::MetaAnalysis => "Meta-Analysis",
            ArticleType::RandomizedControlledTrial => "Randomized Controlled Trial",
            ArticleType::ClinicalTrial => "Clinical Trial",
            ArticleType::BooksAndDocuments => "Books and Documents",
            ArticleType::Review => "Review",
            ArticleType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ArticleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Keyword table, most specific first. The first hit wins.
const RULES: &[(&[&str], ArticleType)] = &[
    (&["systematic"], ArticleType::SystematicReview),
    (&["meta-analysis"], ArticleType::MetaAnalysis),
    (
        &["randomized controlled trial", "randomized"],
        ArticleType::RandomizedControlledTrial,
    ),
    (&["clinical trial"], ArticleType::ClinicalTrial),
    (&["book"], ArticleType::BooksAndDocuments),
    (&["review"], ArticleType::Review),
];

/// Classify an article by substring search over its lower-cased title and abstract.
pub fn classify(title: &str, abstract_text: &str) -> ArticleType {
    let content = format!("{} {}", title, abstract_text).to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| content.contains(k)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ArticleType::Unknown)
}
