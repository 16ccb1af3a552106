//! External summarization client.
//!
//! Sends computed quality metrics to a chat-completions-style endpoint and
//! attaches the returned text verbatim. The service's latency and
//! availability are untrusted: every call is bounded by the configured
//! client timeout and nothing is retried.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::QualityMetrics;
use crate::config::SummarizerSettings;

/// Errors that can occur during summarization.
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("invalid summarizer endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("summarizer request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("summarizer returned no choices")]
    EmptyResponse,
}

pub type SummaryResult<T> = Result<T, SummaryError>;

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatContent,
}

#[derive(Debug, Deserialize)]
struct ChatContent {
    content: String,
}

const SYSTEM_INSTRUCTION: &str = "Give a business perspective in 2 short sentences.";

/// Client for the external text-generation service.
pub struct Summarizer {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl Summarizer {
    /// Build a summarizer from resolved settings.
    pub fn new(settings: &SummarizerSettings) -> SummaryResult<Self> {
        let endpoint = Url::parse(&settings.endpoint)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    /// Request a natural-language summary for one table's metrics.
    ///
    /// Returns the model's text verbatim. One synchronous call per table;
    /// failures surface to the caller, which degrades that item only.
    pub async fn summarize(&self, metrics: &QualityMetrics) -> SummaryResult<String> {
        let prompt = build_prompt(metrics);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut call = self.client.post(self.endpoint.clone()).json(&request);
        if let Some(key) = &self.api_key {
            call = call.bearer_auth(key);
        }

        let response: ChatResponse = call.send().await?.error_for_status()?.json().await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(SummaryError::EmptyResponse)
    }
}

/// Format the metrics as the user prompt. Percentages are rendered to two
/// decimals here, at presentation time only.
pub fn build_prompt(metrics: &QualityMetrics) -> String {
    let mut prompt = format!(
        "Analyze the following data quality metrics and summarize them from \
         a business perspective.\n\n\
         Table: {}\n\
         - Total rows: {}\n\
         - Overall completeness: {:.2}%\n\
         - Overall uniqueness: {:.2}%\n\
         - Duplicate rows: {}\n\
         - Missing values: {}\n\n\
         Column metrics:\n",
        metrics.table_name,
        metrics.total_rows,
        metrics.completeness_percentage,
        metrics.uniqueness_percentage,
        metrics.duplicate_rows,
        metrics.missing_values,
    );

    for (name, column) in &metrics.columns {
        prompt.push_str(&format!(
            "Column '{}': completeness {:.2}%, uniqueness {:.2}%, missing values {}\n",
            name,
            column.completeness_percentage,
            column.uniqueness_percentage,
            column.missing_values,
        ));
    }

    prompt.push_str(
        "\nHighlight the overall quality, the key issues, and any columns \
         needing attention.",
    );

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::ColumnQuality;
    use std::collections::BTreeMap;

    fn sample_metrics() -> QualityMetrics {
        let mut columns = BTreeMap::new();
        columns.insert(
            "email".to_string(),
            ColumnQuality {
                missing_values: 3,
                null_values_percentage: 30.0,
                completeness_percentage: 70.0,
                uniqueness_percentage: 66.666_666,
            },
        );
        QualityMetrics {
            table_name: "customer".to_string(),
            error: None,
            total_rows: 10,
            missing_values: 3,
            duplicate_rows: 1,
            null_values_percentage: 5.0,
            completeness_percentage: 95.0,
            uniqueness_percentage: 83.333_333,
            columns,
            llm_analysis: None,
        }
    }

    #[test]
    fn test_prompt_rounds_to_two_decimals() {
        let prompt = build_prompt(&sample_metrics());
        assert!(prompt.contains("Table: customer"));
        assert!(prompt.contains("Overall completeness: 95.00%"));
        assert!(prompt.contains("Overall uniqueness: 83.33%"));
        assert!(prompt.contains("Column 'email': completeness 70.00%, uniqueness 66.67%"));
    }

    #[test]
    fn test_prompt_lists_every_column() {
        let mut metrics = sample_metrics();
        metrics.columns.insert(
            "phone".to_string(),
            ColumnQuality {
                missing_values: 0,
                null_values_percentage: 0.0,
                completeness_percentage: 100.0,
                uniqueness_percentage: 100.0,
            },
        );
        let prompt = build_prompt(&metrics);
        assert!(prompt.contains("Column 'email'"));
        assert!(prompt.contains("Column 'phone'"));
    }
}
