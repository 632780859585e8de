//! Custom error types for rustpubmed.
//!
//! This module defines all error types used throughout the crawler.
//! All functions return `Result<T, CrawlError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustpubmed operations.
///
/// Uses `thiserror` for ergonomic error handling and automatic `Display` implementation.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote page answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Http {
        /// Status code returned by the server
        status: u16,
        /// Requested URL
        url: String,
    },

    /// HTML or range parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Tabular store error
    #[error("Store error: {0}")]
    Store(String),

    /// External API returned an error
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code from API
        code: i32,
        /// Error message from API
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Operator-supplied fallback input could not be read
    #[error("Input error: {0}")]
    Input(String),
}

impl CrawlError {
    /// Whether a retry of the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            CrawlError::Http { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias using `CrawlError`
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| CrawlError::Parse(msg.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server_err = CrawlError::Http {
            status: 503,
            url: "https://example.org".to_string(),
        };
        assert!(server_err.is_transient());

        let not_found = CrawlError::Http {
            status: 404,
            url: "https://example.org".to_string(),
        };
        assert!(!not_found.is_transient());
        assert!(!CrawlError::Config("missing key".to_string()).is_transient());
    }

    #[test]
    fn test_ok_or_parse() {
        let missing: Option<u32> = None;
        let err = missing.ok_or_parse("no value").err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("Parse error: no value"));
    }
}
