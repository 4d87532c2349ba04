//! OpenAI-compatible chat-completions implementation backed by Groq.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::error::SummaryError;
use super::model::SummaryRecord;
use super::prompt::{
    COMMIT_SYSTEM_PROMPT, PULL_REQUEST_SYSTEM_PROMPT, parse_summary_record,
    render_commit_prompt, render_pull_request_prompt,
};
use super::service::SummaryService;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for [`GroqSummaryService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroqSummaryConfig {
    /// Base API URL (e.g. `https://api.groq.com/openai/v1`).
    pub base_url: String,
    /// Model identifier sent in chat-completions requests.
    pub model: String,
    /// API key used for bearer authentication.
    pub api_key: Option<String>,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl Default for GroqSummaryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GroqSummaryConfig {
    /// Constructs configuration with explicit API settings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            api_key,
            timeout,
        }
    }
}

/// Groq-backed [`SummaryService`] implementation.
///
/// Both chains share one HTTP client; requests carry a zero temperature so
/// repeated summarization of the same input stays stable.
#[derive(Debug, Clone)]
pub struct GroqSummaryService {
    config: GroqSummaryConfig,
    client: Client,
}

impl GroqSummaryService {
    /// Creates a service from explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::Configuration`] when the HTTP client cannot
    /// be built.
    pub fn new(config: GroqSummaryConfig) -> Result<Self, SummaryError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| SummaryError::Configuration {
                message: error.to_string(),
            })?;

        Ok(Self { config, client })
    }

    fn require_api_key(&self) -> Result<&str, SummaryError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(SummaryError::MissingApiKey)
    }

    async fn chat(
        &self,
        system_prompt: &str,
        user_prompt: String,
    ) -> Result<String, SummaryError> {
        let api_key = self.require_api_key()?;
        let endpoint = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            temperature: 0,
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: system_prompt.to_owned(),
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
        };

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| SummaryError::Network {
                message: error.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(SummaryError::Api {
                status,
                message: body,
            });
        }

        let response_payload: ChatCompletionsResponse =
            response
                .json()
                .await
                .map_err(|error| SummaryError::MalformedResponse {
                    message: format!("response JSON decoding failed: {error}"),
                })?;

        response_payload
            .choices
            .first()
            .and_then(|choice| parse_content_value(&choice.message.content))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| SummaryError::MalformedResponse {
                message: "response did not contain assistant text".to_owned(),
            })
    }
}

#[async_trait]
impl SummaryService for GroqSummaryService {
    async fn summarize_commit(&self, message: &str) -> Result<SummaryRecord, SummaryError> {
        let user_prompt = render_commit_prompt(message)?;
        let raw = self.chat(COMMIT_SYSTEM_PROMPT, user_prompt).await?;
        parse_summary_record(&raw)
    }

    async fn summarize_pull_request(
        &self,
        title: &str,
        description: &str,
    ) -> Result<SummaryRecord, SummaryError> {
        let user_prompt = render_pull_request_prompt(title, description)?;
        let raw = self.chat(PULL_REQUEST_SYSTEM_PROMPT, user_prompt).await?;
        parse_summary_record(&raw)
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    temperature: u8,
    messages: Vec<ChatCompletionsMessage>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, serde::Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, serde::Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, serde::Deserialize)]
struct ChatContentPart {
    text: Option<String>,
    content: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ChatChoiceMessage {
    content: ChatContent,
}

fn parse_content_value(content: &ChatContent) -> Option<&str> {
    match content {
        ChatContent::Text(text) => Some(text.as_str()),
        ChatContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().or(part.content.as_deref())),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output = String::new();
    let mut chars = message.chars();

    for _ in 0..max_chars {
        let Some(character) = chars.next() else {
            return output;
        };
        output.push(character);
    }

    if chars.next().is_some() {
        output.push_str("...");
    }

    output
}
