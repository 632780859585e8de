//! HTTP session against the PubMed web front end.
//!
//! One `reqwest::Client` is shared by every search and detail fetch in a run.
//! Search pages are fetched without a timeout; detail pages get a fixed
//! per-request timeout and a bounded retry on transient failures.

use crate::error::{CrawlError, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Default PubMed site root; detail pages live at `<root><pmid>/`
pub const DEFAULT_PUBMED_URL: &str = "https://pubmed.ncbi.nlm.nih.gov/";

/// User agent string for requests
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Timeout applied to each detail page request
pub const DETAIL_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a search page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPage {
    /// Page markup, ready for PMID extraction
    Markup(String),
    /// The server refused the request as too long (HTTP 414)
    UriTooLong,
}

/// PubMed client with retry for detail pages
#[derive(Debug, Clone)]
pub struct PubMedClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    initial_backoff: Duration,
}

impl PubMedClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - PubMed site root; a missing trailing slash is added
    /// * `max_retries` - Extra attempts for a detail page after a transient failure
    pub fn new(base_url: impl Into<String>, max_retries: u32) -> Result<Self> {
        let mut base_url = base_url.into();
        url::Url::parse(&base_url)
            .map_err(|e| CrawlError::Config(format!("Invalid PubMed URL {}: {}", base_url, e)))?;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()
            .map_err(|e| CrawlError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            max_retries,
            initial_backoff: Duration::from_millis(500),
        })
    }

    /// Override the first retry delay (tests use zero)
    pub fn with_backoff(mut self, initial_backoff: Duration) -> Self {
        self.initial_backoff = initial_backoff;
        self
    }

    /// Detail page URL for a PMID
    pub fn detail_url(&self, pmid: &str) -> String {
        format!("{}{}/", self.base_url, pmid)
    }

    /// Fetch a search results page.
    ///
    /// HTTP 414 is reported as [`SearchPage::UriTooLong`] rather than an error.
    pub async fn fetch_search_page(&self, url: &str) -> Result<SearchPage> {
        debug!(url = %url, "Fetching search page");

        let response = self.request(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::URI_TOO_LONG {
            return Ok(SearchPage::UriTooLong);
        }
        if !status.is_success() {
            return Err(CrawlError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(SearchPage::Markup(response.text().await?))
    }

    /// Fetch the detail page for a PMID, retrying transient failures with backoff.
    pub async fn fetch_detail_page(&self, pmid: &str) -> Result<String> {
        let url = self.detail_url(pmid);
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            match self.fetch_detail_once(&url).await {
                Ok(html) => return Ok(html),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let jitter = Duration::from_millis(rand::random::<u64>() % 250);
                    let wait = if backoff.is_zero() { backoff } else { backoff + jitter };
                    warn!(
                        pmid = pmid,
                        attempt = attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Detail fetch failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    backoff *= 2;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn fetch_detail_once(&self, url: &str) -> Result<String> {
        let response = self.request(url).timeout(DETAIL_TIMEOUT).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(CrawlError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(CrawlError::Network)
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.9")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server, retries: u32) -> PubMedClient {
        PubMedClient::new(format!("{}/", server.url()), retries)
            .expect("client")
            .with_backoff(Duration::ZERO)
    }

    #[test]
    fn test_detail_url() {
        let client = PubMedClient::new(DEFAULT_PUBMED_URL, 0).expect("client");
        assert_eq!(client.detail_url("123"), "https://pubmed.ncbi.nlm.nih.gov/123/");

        let bare = PubMedClient::new("http://localhost:8080", 0).expect("client");
        assert_eq!(bare.detail_url("9"), "http://localhost:8080/9/");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            PubMedClient::new("not a url", 0),
            Err(CrawlError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_search_page_414() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(414)
            .create_async()
            .await;

        let client = client_for(&server, 0);
        let page = client
            .fetch_search_page(&format!("{}/?term=x&&size=200", server.url()))
            .await
            .expect("fetch");
        assert_eq!(page, SearchPage::UriTooLong);
    }

    #[tokio::test]
    async fn test_search_page_server_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = client_for(&server, 0);
        let result = client
            .fetch_search_page(&format!("{}/?term=x&&size=200", server.url()))
            .await;
        assert!(matches!(result, Err(CrawlError::Http { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_detail_page_ok() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/42/")
            .with_status(200)
            .with_body("<html>ok</html>")
            .create_async()
            .await;

        let client = client_for(&server, 2);
        let html = client.fetch_detail_page("42").await.expect("fetch");
        assert_eq!(html, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_detail_exhausts_retries() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/7/")
            .with_status(502)
            .expect(3)
            .create_async()
            .await;

        let client = client_for(&server, 2);
        let result = client.fetch_detail_page("7").await;
        assert!(matches!(result, Err(CrawlError::Http { status: 502, .. })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_detail_not_found_is_not_retried() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/8/")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server, 3);
        let result = client.fetch_detail_page("8").await;
        assert!(matches!(result, Err(CrawlError::Http { status: 404, .. })));
        mock.assert_async().await;
    }
}
