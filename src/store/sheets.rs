//! Google Sheets values API backend.
//!
//! Authenticates with a caller-supplied OAuth bearer token; minting and
//! refreshing that token is left to the environment.

use super::range::cell_name;
use super::TabularStore;
use crate::error::{CrawlError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Google Sheets API root
pub const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Sheets client bound to one spreadsheet
pub struct SheetsStore {
    client: reqwest::Client,
    api_url: String,
    spreadsheet_id: String,
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeBody<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Vec<String>],
}

impl SheetsStore {
    pub fn new(spreadsheet_id: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_api_url(SHEETS_API_URL, spreadsheet_id, access_token)
    }

    /// Point the client at another API root (tests)
    pub fn with_api_url(
        api_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CrawlError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            spreadsheet_id: spreadsheet_id.into(),
            access_token: access_token.into(),
        })
    }

    fn values_url(&self, a1: &str) -> String {
        format!(
            "{}/{}/values/{}",
            self.api_url,
            self.spreadsheet_id,
            urlencoding::encode(a1)
        )
    }

    async fn get_values(&self, a1: &str, major_dimension: &str) -> Result<Vec<Vec<String>>> {
        debug!(range = a1, "Reading sheet values");
        let response = self
            .client
            .get(self.values_url(a1))
            .bearer_auth(&self.access_token)
            .query(&[("majorDimension", major_dimension)])
            .send()
            .await?;

        let response = check_status(response).await?;
        let data: ValueRange = response.json().await?;
        Ok(data
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    async fn put_values(&self, a1: &str, rows: &[Vec<String>]) -> Result<()> {
        debug!(range = a1, rows = rows.len(), "Writing sheet values");
        let body = ValueRangeBody {
            range: a1,
            major_dimension: "ROWS",
            values: rows,
        };
        let response = self
            .client
            .put(self.values_url(a1))
            .bearer_auth(&self.access_token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Qualify a range with its sheet name, quoting as the API expects
fn qualified(sheet: &str, range: &str) -> String {
    format!("'{}'!{}", sheet.replace('\'', "''"), range)
}

fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(CrawlError::Api {
        code: status.as_u16() as i32,
        message: format!("Sheets API error: {} - {}", status, message),
    })
}

#[async_trait]
impl TabularStore for SheetsStore {
    async fn read(&self, sheet: &str, range: &str) -> Result<Vec<Vec<String>>> {
        self.get_values(&qualified(sheet, range), "ROWS").await
    }

    async fn write(&self, sheet: &str, range: &str, rows: &[Vec<String>]) -> Result<()> {
        self.put_values(&qualified(sheet, range), rows).await
    }

    async fn column_values(&self, sheet: &str, column: &str) -> Result<Vec<String>> {
        let a1 = qualified(sheet, &format!("{}1:{}", column, column));
        let columns = self.get_values(&a1, "COLUMNS").await?;
        Ok(columns.into_iter().next().unwrap_or_default())
    }

    async fn update_cell(&self, sheet: &str, row: usize, col: usize, value: &str) -> Result<()> {
        self.put_values(&qualified(sheet, &cell_name(row, col)), &[vec![value.to_string()]])
            .await
    }
}
