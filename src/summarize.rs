//! Key-point summaries for stored abstracts.
//!
//! Walks the literature sheet and fills column N for every titled row that
//! has no summary yet. Each abstract is sent to an OpenAI-compatible chat
//! completions endpoint; a failed row is logged and left for the next run.

use crate::error::{CrawlError, Result};
use crate::prompts::summary::{build_system_prompt, build_user_prompt};
use crate::store::Workbook;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Text in, generated prose out
#[async_trait]
pub trait TextTransform: Send + Sync {
    async fn transform(&self, text: &str) -> Result<Generated>;
}

/// Generated text with the tokens it cost
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub usage: TokenUsage,
}

/// Token usage tracking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    /// Output language named in the prompts
    pub language: String,
}

/// OpenAI-compatible API response structures
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

/// Chat-completions summarizer
pub struct ChatSummarizer {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ChatSummarizer {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CrawlError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextTransform for ChatSummarizer {
    async fn transform(&self, text: &str) -> Result<Generated> {
        let request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": build_system_prompt(&self.config.language)},
                {"role": "user", "content": build_user_prompt(&self.config.language, text)}
            ]
        });

        let api_url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(CrawlError::Network)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CrawlError::Api {
                code: status.as_u16() as i32,
                message: format!("LLM API error: {} - {}", status, error_text),
            });
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::Parse(format!("Failed to parse LLM response: {}", e)))?;

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        let text = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| CrawlError::Parse("LLM returned no content".to_string()))?;

        Ok(Generated { text, usage })
    }
}

/// Totals for one summary pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryReport {
    pub summarized: usize,
    pub skipped: usize,
    pub failed: usize,
    pub usage: TokenUsage,
}

/// Fill the summary column for every titled row that lacks one.
pub async fn summarize_sheet(
    workbook: &Workbook,
    model: &dyn TextTransform,
) -> Result<SummaryReport> {
    let rows = workbook.read_literature_rows().await?;
    let mut report = SummaryReport::default();

    info!(rows = rows.len(), "Starting summary generation");

    for row in rows {
        if row.title.is_empty() || !row.summary.is_empty() {
            report.skipped += 1;
            continue;
        }

        let generated = match model.transform(&row.abstract_text).await {
            Ok(generated) => generated,
            Err(e) => {
                warn!(row = row.row, error = %e, "Summary generation failed");
                report.failed += 1;
                continue;
            }
        };
        report.usage.add(&generated.usage);

        match workbook.write_summary(row.row, &generated.text).await {
            Ok(()) => {
                debug!(row = row.row, "Summary written");
                report.summarized += 1;
            }
            Err(e) => {
                warn!(row = row.row, error = %e, "Failed to write summary");
                report.failed += 1;
            }
        }
    }

    info!(
        summarized = report.summarized,
        skipped = report.skipped,
        failed = report.failed,
        total_tokens = report.usage.total_tokens,
        "Summary generation complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, TabularStore};
    use mockito::Server;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl TextTransform for Echo {
        async fn transform(&self, text: &str) -> Result<Generated> {
            if text.contains("fail") {
                return Err(CrawlError::Api {
                    code: 500,
                    message: "boom".to_string(),
                });
            }
            Ok(Generated {
                text: format!("- {}", text),
                usage: TokenUsage {
                    prompt_tokens: 1,
                    completion_tokens: 1,
                    total_tokens: 2,
                },
            })
        }
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_summarize_sheet_skips_and_continues() -> Result<()> {
        let mut already = row(&["Done title", "abs"]);
        already.resize(14, String::new());
        already[13] = "existing".to_string();

        let store = Arc::new(MemoryStore::new().with_sheet(
            "lit",
            vec![
                row(&["title", "abstract"]),
                row(&["T1", "first"]),
                row(&["", "no title"]),
                already,
                row(&["T4", "please fail"]),
                row(&["T5", "fifth"]),
            ],
        ));
        let workbook = Workbook::new(store.clone(), "q", "lit");

        let report = summarize_sheet(&workbook, &Echo).await?;
        assert_eq!(report.summarized, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.usage.total_tokens, 4);

        let summaries = store.read("lit", "N2:N6").await?;
        assert_eq!(
            summaries,
            vec![row(&["- first"]), row(&[]), row(&["existing"]), row(&[]), row(&["- fifth"])]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_summarizer() -> Result<()> {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer key")
            .with_status(200)
            .with_body(
                r#"{"choices": [{"message": {"content": "- lowers glucose"}}],
                    "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}}"#,
            )
            .create_async()
            .await;

        let summarizer = ChatSummarizer::new(LlmConfig {
            base_url: server.url(),
            api_key: "key".to_string(),
            model: "gpt-4".to_string(),
            language: "English".to_string(),
        })?;
        let generated = summarizer.transform("Metformin lowers glucose.").await?;
        assert_eq!(generated.text, "- lowers glucose");
        assert_eq!(generated.usage.total_tokens, 15);
        Ok(())
    }

    #[tokio::test]
    async fn test_chat_summarizer_api_error() -> Result<()> {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body("bad key")
            .create_async()
            .await;

        let summarizer = ChatSummarizer::new(LlmConfig {
            base_url: format!("{}/", server.url()),
            api_key: "nope".to_string(),
            model: "gpt-4".to_string(),
            language: "English".to_string(),
        })?;
        let result = summarizer.transform("x").await;
        assert!(matches!(result, Err(CrawlError::Api { code: 401, .. })));
        Ok(())
    }
}
