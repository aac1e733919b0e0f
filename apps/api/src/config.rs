use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::conversation::engine::EngineSettings;
use crate::llm_client::TransportSettings;

const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";

#[derive(Debug, Clone)]
pub struct AzureSettings {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

#[derive(Debug, Clone)]
pub struct AnthropicSettings {
    pub api_key: String,
    pub model: String,
}

/// Which hosted model backs both stages. Selected by `LLM_PROVIDER`.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Azure(AzureSettings),
    Anthropic(AnthropicSettings),
}

/// Application configuration loaded from environment variables.
/// Built once in `main` and passed by reference; fails at startup if required
/// variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_provider: LlmProvider,
    pub collector_temperature: f32,
    pub generator_temperature: f32,
    pub llm_timeout_secs: u64,
    pub llm_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let provider = std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "azure".to_string());
        let llm_provider = match provider.to_lowercase().as_str() {
            "azure" => LlmProvider::Azure(AzureSettings {
                endpoint: require_env("AZURE_OPENAI_ENDPOINT")?,
                api_key: require_env("AZURE_OPENAI_API_KEY")?,
                deployment: require_env("AZURE_OPENAI_DEPLOYMENT_NAME")?,
                api_version: require_env("AZURE_OPENAI_API_VERSION")?,
            }),
            "anthropic" => LlmProvider::Anthropic(AnthropicSettings {
                api_key: require_env("ANTHROPIC_API_KEY")?,
                model: std::env::var("ANTHROPIC_MODEL")
                    .unwrap_or_else(|_| DEFAULT_ANTHROPIC_MODEL.to_string()),
            }),
            other => bail!("LLM_PROVIDER must be 'azure' or 'anthropic', got '{other}'"),
        };

        Ok(Config {
            llm_provider,
            collector_temperature: parse_env("COLLECTOR_TEMPERATURE", 0.2)?,
            generator_temperature: parse_env("GENERATOR_TEMPERATURE", 0.0)?,
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 120)?,
            llm_max_attempts: parse_env("LLM_MAX_ATTEMPTS", 1)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            collector_temperature: self.collector_temperature,
            generator_temperature: self.generator_temperature,
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            timeout: Duration::from_secs(self.llm_timeout_secs),
            max_attempts: self.llm_max_attempts.max(1),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{raw}'"))
}
