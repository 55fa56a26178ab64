//! Generation provider implementations.
//!
//! Concrete backends for the [`Generator`] trait defined in `ragdesk-core`:
//! - **[`OpenAIGenerator`]**: OpenAI-compatible `POST /v1/chat/completions`.
//! - **[`OllamaGenerator`]**: Ollama's `POST /api/generate` (non-streaming).
//!
//! The whole prompt is sent as a single user turn. Decoding is bounded by
//! `generation.max_new_tokens`; `temperature = 0.0` requests greedy output.
//! Both providers retry transient failures through [`crate::backoff`] and
//! return the completion with surrounding whitespace trimmed.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use ragdesk_core::generation::Generator;

use crate::backoff::{send_json_with_retry, RetryPolicy};
use crate::config::GenerationConfig;

const OPENAI_DEFAULT_URL: &str = "https://api.openai.com";
const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434";

/// Decoding settings shared by both providers.
#[derive(Debug, Clone, Copy)]
struct Decoding {
    max_new_tokens: u32,
    temperature: f32,
}

impl From<&GenerationConfig> for Decoding {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
        }
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

// ============ OpenAI Provider ============

/// Chat-completions generator for OpenAI or any compatible endpoint.
///
/// The base URL comes from `generation.url`, then `OPENAI_BASE_URL`, then
/// `https://api.openai.com`. Requires `OPENAI_API_KEY`.
pub struct OpenAIGenerator {
    model: String,
    api_key: String,
    url: String,
    decoding: Decoding,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl OpenAIGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))?;
        let url = config
            .url
            .clone()
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());

        Ok(Self {
            model: config.model.clone(),
            api_key,
            url: url.trim_end_matches('/').to_string(),
            decoding: config.into(),
            retry: RetryPolicy::new(config.max_retries),
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/v1/chat/completions", self.url);
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.decoding.max_new_tokens,
            "temperature": self.decoding.temperature,
        });

        let json = send_json_with_retry(
            || {
                self.client
                    .post(&endpoint)
                    .header("Authorization", format!("Bearer {}", self.api_key))
                    .json(&body)
            },
            "OpenAI",
            self.retry,
        )
        .await?;

        parse_openai_completion(&json)
    }
}

/// Extract `choices[0].message.content`.
fn parse_openai_completion(json: &serde_json::Value) -> Result<String> {
    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing choices[0].message.content"))?;
    Ok(content.trim().to_string())
}

// ============ Ollama Provider ============

/// Completion generator using a local Ollama instance.
pub struct OllamaGenerator {
    model: String,
    url: String,
    decoding: Decoding,
    retry: RetryPolicy,
    client: reqwest::Client,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let url = config
            .url
            .clone()
            .unwrap_or_else(|| OLLAMA_DEFAULT_URL.to_string());

        Ok(Self {
            model: config.model.clone(),
            url: url.trim_end_matches('/').to_string(),
            decoding: config.into(),
            retry: RetryPolicy::new(config.max_retries),
            client: http_client(config.timeout_secs)?,
        })
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let endpoint = format!("{}/api/generate", self.url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "num_predict": self.decoding.max_new_tokens,
                "temperature": self.decoding.temperature,
            },
        });

        let json = send_json_with_retry(
            || self.client.post(&endpoint).json(&body),
            "Ollama",
            self.retry,
        )
        .await
        .map_err(|e| anyhow::anyhow!("{} (is Ollama running at {}?)", e, self.url))?;

        parse_ollama_completion(&json)
    }
}

fn parse_ollama_completion(json: &serde_json::Value) -> Result<String> {
    let text = json
        .get("response")
        .and_then(|r| r.as_str())
        .ok_or_else(|| anyhow::anyhow!("Invalid Ollama response: missing response field"))?;
    Ok(text.trim().to_string())
}

/// Create the configured [`Generator`].
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"openai"` | [`OpenAIGenerator`] |
/// | `"ollama"` | [`OllamaGenerator`] |
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn Generator>> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIGenerator::new(config)?)),
        "ollama" => Ok(Arc::new(OllamaGenerator::new(config)?)),
        other => bail!("Unknown generation provider: {}", other),
    }
}
