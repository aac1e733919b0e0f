//! Azure OpenAI chat-completions backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    build_http_client, non_empty, send_with_retry, ChatModel, ChatRequest, LlmError,
    TransportSettings,
};
use crate::config::AzureSettings;

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Clone)]
pub struct AzureOpenAiClient {
    client: Client,
    settings: AzureSettings,
    max_attempts: u32,
}

impl AzureOpenAiClient {
    pub fn new(settings: AzureSettings, transport: TransportSettings) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_http_client(&transport)?,
            settings,
            max_attempts: transport.max_attempts,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.deployment,
            self.settings.api_version
        )
    }
}

/// The system prompt travels as the first message; history follows in order.
fn wire_messages<'a>(request: &'a ChatRequest<'a>) -> Vec<WireMessage<'a>> {
    std::iter::once(WireMessage {
        role: "system",
        content: request.system,
    })
    .chain(request.messages.iter().map(|m| WireMessage {
        role: m.role.as_str(),
        content: &m.content,
    }))
    .collect()
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    async fn complete(&self, request: &ChatRequest<'_>) -> Result<String, LlmError> {
        let body = CompletionRequest {
            messages: wire_messages(request),
            temperature: request.temperature,
        };
        let url = self.url();

        let response = send_with_retry(self.max_attempts, || {
            self.client
                .post(&url)
                .header("api-key", &self.settings.api_key)
                .header("content-type", "application/json")
                .json(&body)
        })
        .await?;

        let completion: CompletionResponse = response.json().await?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Azure call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        non_empty(
            completion
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
        )
    }

    fn model_id(&self) -> &str {
        &self.settings.deployment
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversation::ChatMessage;

    #[test]
    fn test_wire_messages_put_system_first() {
        let history = vec![
            ChatMessage::user("I'm a senior analyst"),
            ChatMessage::assistant("Are you applying for a specific job?"),
        ];
        let request = ChatRequest {
            system: "collect info",
            messages: &history,
            temperature: 0.2,
        };

        let wire = wire_messages(&request);
        let roles: Vec<_> = wire.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(wire[0].content, "collect info");
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let client = AzureOpenAiClient::new(
            AzureSettings {
                endpoint: "https://example.openai.azure.com/".to_string(),
                api_key: "key".to_string(),
                deployment: "gpt-4o".to_string(),
                api_version: "2024-06-01".to_string(),
            },
            TransportSettings {
                timeout: std::time::Duration::from_secs(5),
                max_attempts: 1,
            },
        )
        .unwrap();

        assert_eq!(
            client.url(),
            "https://example.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-06-01"
        );
    }

    #[test]
    fn test_completion_response_parses_content() {
        let json = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let parsed: CompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("Hello"));
    }
}
