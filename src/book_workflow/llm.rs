use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;

pub const TEMPERATURE: f64 = 0.7;
pub const MAX_TOKENS: u32 = 100;

/// Anything that turns a single user prompt into a completion.
/// The handler only sees this trait, so tests can swap in a canned model.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

// -- chat completions wire format

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    n: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI chat completions: the prompt is sent as the lone user message,
/// no system prompt, one candidate, no stop sequence.
#[derive(Debug, Clone)]
pub struct OpenAiCompletion {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build completion HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            &config.openai_base_url,
            &config.openai_api_key,
            &config.openai_model,
            config.outbound_timeout,
        )
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            n: 1,
        }
    }
}

#[async_trait]
impl CompletionModel for OpenAiCompletion {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("Sending prompt to {} ({} chars)", url, prompt.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .context("completion request failed")?;

        let status = response.status();
        info!("Received completion response status: {}", status);

        let body = response
            .text()
            .await
            .context("failed to read completion response body")?;

        if !status.is_success() {
            return Err(anyhow!("completion API returned {}: {}", status, body));
        }
        debug!("Completion response body: {}", body);

        let completion: ChatCompletionResponse =
            serde_json::from_str(&body).context("failed to decode completion response")?;

        completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("completion response contained no choices"))?
            .message
            .content
            .ok_or_else(|| anyhow!("first completion choice had no text"))
    }
}
