//! Anthropic Messages API backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    build_http_client, non_empty, send_with_retry, ChatModel, ChatRequest, LlmError,
    TransportSettings,
};
use crate::config::AnthropicSettings;
use crate::models::conversation::Role;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
/// Appended when the history ends on an assistant turn. The Messages API would
/// otherwise treat that turn as a prefill and continue it.
const CONTINUE_PROMPT: &str = "Please write the CV now.";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    /// Extracts the text content from the first text block.
    fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text)
    }
}

fn build_request<'a>(model: &'a str, request: &ChatRequest<'a>) -> AnthropicRequest<'a> {
    let mut messages: Vec<AnthropicMessage<'a>> = request
        .messages
        .iter()
        .map(|m| AnthropicMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect();

    if request.messages.last().map(|m| m.role) == Some(Role::Assistant) {
        messages.push(AnthropicMessage {
            role: Role::User.as_str(),
            content: CONTINUE_PROMPT,
        });
    }

    AnthropicRequest {
        model,
        max_tokens: MAX_TOKENS,
        system: request.system,
        temperature: request.temperature,
        messages,
    }
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    settings: AnthropicSettings,
    max_attempts: u32,
}

impl AnthropicClient {
    pub fn new(settings: AnthropicSettings, transport: TransportSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(&transport)?,
            settings,
            max_attempts: transport.max_attempts,
        })
    }
}

#[async_trait]
impl ChatModel for AnthropicClient {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let body = build_request(&self.settings.model, request);

        let response = send_with_retry(self.max_attempts, || {
            self.client
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.settings.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&body)
        })
        .await?;

        let llm_response: AnthropicResponse = response.json().await?;

        debug!(
            "Anthropic call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        non_empty(llm_response.into_text())
    }

    fn model_id(&self) -> &str {
        &self.settings.model
    }
}
