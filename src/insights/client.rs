//! OpenAI-compatible chat completion client

use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{body_excerpt, Error, Result};
use crate::insights::{CompletionRequest, InsightsConfig, Summarizer};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Chat completion client for any OpenAI-compatible endpoint
pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    /// Give up retrying after this long
    retry_max_elapsed: Duration,
}

impl LlmClient {
    /// Create a client from insights configuration.
    ///
    /// Falls back to `OPENAI_API_KEY` when `api_key` is not configured.
    pub fn new(config: &InsightsConfig) -> Result<Self> {
        let api_key = if config.api_key.is_empty() {
            std::env::var(API_KEY_ENV).map_err(|_| {
                Error::Config(format!(
                    "insights.api_key is not set and {} is missing",
                    API_KEY_ENV
                ))
            })?
        } else {
            config.api_key.clone()
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            retry_max_elapsed: Duration::from_millis(config.timeout_ms),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Single completion attempt
    async fn complete_once(&self, request: &CompletionRequest) -> Result<String> {
        debug!(model = %request.model, prompt_len = request.prompt.len(), "Sending completion request");

        let body = ChatRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Llm(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse LLM response: {}", e)))?;

        first_content(reply)
    }
}

#[async_trait]
impl Summarizer for LlmClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(self.retry_max_elapsed),
            ..Default::default()
        };
        let request = &request;

        retry(backoff, || async move {
            match self.complete_once(request).await {
                Ok(content) => Ok(content),
                Err(e) if e.is_retryable() => {
                    warn!(model = %request.model, "Retryable LLM error: {}", e);
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        })
        .await
    }
}

/// Error for a non-success completion response
fn status_error(status: StatusCode, body: &str) -> Error {
    Error::LlmStatus {
        status: status.as_u16(),
        body: body_excerpt(body),
    }
}

/// Content of the first choice
fn first_content(reply: ChatResponse) -> Result<String> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(Error::LlmEmptyResponse)
}

// ============ Chat completion wire types ============

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}
