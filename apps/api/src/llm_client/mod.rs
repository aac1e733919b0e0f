/// LLM Client — the single point of entry for all language-model calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Stages talk to a `ChatModel`; this module decides which provider sits behind it.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::config::{Config, LlmProvider};
use crate::models::conversation::ChatMessage;

pub mod anthropic;
pub mod azure;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use azure::AzureOpenAiClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// One completion request: a system prompt followed by the conversation so far.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub messages: &'a [ChatMessage],
    pub temperature: f32,
}

/// A chat-completion backend. Stages hold an `Arc<dyn ChatModel>` so tests can
/// substitute a scripted model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Returns the text of the next assistant message.
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, LlmError>;

    fn model_id(&self) -> &str;
}

/// Transport settings shared by every provider.
#[derive(Debug, Clone, Copy)]
pub struct TransportSettings {
    pub timeout: Duration,
    /// Total HTTP attempts per call. 1 disables transport retries.
    pub max_attempts: u32,
}

pub(crate) fn build_http_client(settings: &TransportSettings) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(settings.timeout).build()?)
}

/// Builds the provider selected in `config`.
pub fn build_chat_model(config: &Config) -> anyhow::Result<Arc<dyn ChatModel>> {
    let transport = config.transport_settings();
    let model: Arc<dyn ChatModel> = match &config.llm_provider {
        LlmProvider::Azure(azure) => Arc::new(AzureOpenAiClient::new(azure.clone(), transport)?),
        LlmProvider::Anthropic(anthropic) => {
            Arc::new(AnthropicClient::new(anthropic.clone(), transport)?)
        }
    };
    Ok(model)
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Sends a request built by `build`, retrying 429 and 5xx responses with
/// exponential backoff until `max_attempts` is reached.
/// Other non-success statuses fail immediately.
pub(crate) async fn send_with_retry<F>(max_attempts: u32, build: F) -> Result<Response, LlmError>
where
    F: Fn() -> RequestBuilder,
{
    let max_attempts = max_attempts.max(1);
    let mut last_error: Option<LlmError> = None;

    for attempt in 0..max_attempts {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s
            let delay = Duration::from_millis(1000 * (1 << (attempt - 1).min(5)));
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        let response = match build().send().await {
            Ok(r) => r,
            Err(e) => {
                last_error = Some(LlmError::Http(e));
                continue;
            }
        };

        let status = response.status();

        if status.as_u16() == 429 || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            last_error = Some(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
            continue;
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: extract_error_message(body),
            });
        }

        return Ok(response);
    }

    match last_error {
        Some(err) if max_attempts == 1 => Err(err),
        Some(err) => {
            warn!("LLM call failed after {max_attempts} attempts: {err}");
            Err(LlmError::Exhausted {
                attempts: max_attempts,
            })
        }
        None => Err(LlmError::Exhausted {
            attempts: max_attempts,
        }),
    }
}

/// Both providers wrap errors as `{"error": {"message": ...}}`.
fn extract_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

/// Rejects whitespace-only completions.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, LlmError> {
    match text {
        Some(t) if !t.trim().is_empty() => Ok(t),
        _ => Err(LlmError::EmptyContent),
    }
}
