//! Environment-driven configuration.
//!
//! Values come from the process environment, after `.env` has been loaded by
//! the binary. CLI flags override the crawl tuning fields.

use crate::error::{CrawlError, Result};
use crate::prompts::summary::DEFAULT_SUMMARY_LANGUAGE;
use crate::pubmed::DEFAULT_PUBMED_URL;
use crate::store::workbook::{DEFAULT_SOURCE_SHEET, DEFAULT_TARGET_SHEET};
use crate::summarize::LlmConfig;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

#[derive(Debug, Clone)]
pub struct Config {
    pub spreadsheet_id: Option<String>,
    pub google_access_token: Option<String>,
    pub source_sheet: String,
    pub target_sheet: String,
    pub pubmed_url: String,
    pub concurrency: usize,
    pub max_retries: u32,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub summary_language: String,
}

fn default_concurrency() -> usize {
    1
}

fn default_max_retries() -> u32 {
    2
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            spreadsheet_id: get("SPREADSHEET_ID"),
            google_access_token: get("GOOGLE_ACCESS_TOKEN"),
            source_sheet: get("SOURCE_SHEET").unwrap_or_else(|| DEFAULT_SOURCE_SHEET.into()),
            target_sheet: get("TARGET_SHEET").unwrap_or_else(|| DEFAULT_TARGET_SHEET.into()),
            pubmed_url: get("PUBMED_BASE_URL").unwrap_or_else(|| DEFAULT_PUBMED_URL.into()),
            concurrency: get("CRAWL_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_concurrency),
            max_retries: get("CRAWL_MAX_RETRIES")
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_max_retries),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.into()),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into()),
            summary_language: get("SUMMARY_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_SUMMARY_LANGUAGE.into()),
        }
    }

    /// Search endpoint derived from the PubMed site root
    pub fn search_base_url(&self) -> String {
        format!("{}/?term=", self.pubmed_url.trim_end_matches('/'))
    }

    /// Spreadsheet id and bearer token for the Sheets backend
    pub fn sheets_credentials(&self) -> Result<(String, String)> {
        let id = self
            .spreadsheet_id
            .clone()
            .ok_or_else(|| CrawlError::Config("SPREADSHEET_ID is not set".to_string()))?;
        let token = self
            .google_access_token
            .clone()
            .ok_or_else(|| CrawlError::Config("GOOGLE_ACCESS_TOKEN is not set".to_string()))?;
        Ok((id, token))
    }

    pub fn llm_config(&self) -> Result<LlmConfig> {
        let api_key = self
            .openai_api_key
            .clone()
            .ok_or_else(|| CrawlError::Config("OPENAI_API_KEY is not set".to_string()))?;
        Ok(LlmConfig {
            base_url: self.openai_base_url.clone(),
            api_key,
            model: self.openai_model.clone(),
            language: self.summary_language.clone(),
        })
    }
}
