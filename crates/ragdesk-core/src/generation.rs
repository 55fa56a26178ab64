//! Text generation provider trait.
//!
//! Concrete providers (OpenAI chat completions, Ollama) live in the
//! `ragdesk` app crate. The core only needs `prompt -> completion`.

use async_trait::async_trait;

/// Trait for text generation providers.
///
/// May be deterministic (greedy decoding) or stochastic depending on how
/// the provider is configured. Output length bounds are the provider's
/// responsibility.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Returns the model identifier (e.g. `"llama3.2"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}
