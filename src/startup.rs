//! One-time pipeline construction.
//!
//! Loads the corpus, creates the providers, embeds every document, and
//! assembles the [`Pipeline`]. Nothing here runs again after startup;
//! the server binds only once [`build_pipeline`] has returned.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use ragdesk_core::embedding::Embedder;
use ragdesk_core::generation::Generator;
use ragdesk_core::knowledge::KnowledgeBase;
use ragdesk_core::pipeline::Pipeline;
use ragdesk_core::prompt::PromptTemplate;

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::embedding::create_embedder;
use crate::generation::create_generator;

/// Build the pipeline from configuration, creating real providers.
pub async fn build_pipeline(config: &Config) -> Result<Pipeline> {
    // Local models download and load synchronously.
    let embedding_config = config.embedding.clone();
    let embedder = tokio::task::spawn_blocking(move || create_embedder(&embedding_config))
        .await
        .context("embedding provider initialization panicked")??;
    let generator = create_generator(&config.generation)?;

    build_pipeline_with(config, embedder, generator).await
}

/// Build the pipeline from configuration with the given providers.
pub async fn build_pipeline_with(
    config: &Config,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
) -> Result<Pipeline> {
    let documents = load_corpus(&config.corpus.path)?;
    info!(
        path = %config.corpus.path.display(),
        document_count = documents.len(),
        "loaded corpus"
    );

    let knowledge = KnowledgeBase::build(documents, embedder.as_ref())
        .await
        .context("Failed to build knowledge base")?;

    let template = PromptTemplate::new(config.prompt.template.as_str())?;

    let pipeline = Pipeline::builder(Arc::new(knowledge), embedder, generator)
        .top_k(config.retrieval.top_k)
        .template(template)
        .max_passage_chars(config.retrieval.max_passage_chars)
        .build()?;

    info!(
        documents = pipeline.knowledge().len(),
        dims = pipeline.knowledge().dims(),
        embedder = pipeline.embedder_model(),
        generator = pipeline.generator_model(),
        top_k = pipeline.top_k(),
        "pipeline ready"
    );

    Ok(pipeline)
}
