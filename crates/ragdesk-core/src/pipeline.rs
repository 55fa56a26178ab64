//! Answer pipeline orchestrator.
//!
//! The [`Pipeline`] composes retrieval, context assembly, prompt building,
//! and generation:
//!
//! ```text
//! documents = retrieve(question, K, embedder, index, corpus)
//! context   = assemble(documents)
//! prompt    = template.render(context, question)
//! answer    = generator.generate(prompt)
//! ```
//!
//! It is constructed once at startup and shared by reference (or `Arc`)
//! across request handlers. It holds no request-scoped state, so
//! concurrent calls need no locking. There is no retry and no caching:
//! every call recomputes retrieval and regenerates. `sources` is always
//! the full retrieval result, whatever the generator chose to use.
//!
//! # Example
//!
//! ```rust,ignore
//! let pipeline = Pipeline::builder(knowledge, embedder, generator)
//!     .top_k(2)
//!     .template(PromptTemplate::new(template)?)
//!     .build()?;
//! let answer = pipeline.answer("Is fire damage covered?").await?;
//! ```

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::context::ContextAssembler;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::generation::Generator;
use crate::knowledge::KnowledgeBase;
use crate::models::{Answer, Document, RetrievedDocument};
use crate::prompt::PromptTemplate;
use crate::retrieve::retrieve_scored;

/// Default number of documents retrieved per question.
pub const DEFAULT_TOP_K: usize = 2;

/// The retrieval-augmented answer pipeline.
pub struct Pipeline {
    knowledge: Arc<KnowledgeBase>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    template: PromptTemplate,
    assembler: ContextAssembler,
    top_k: usize,
}

impl Pipeline {
    /// Start building a pipeline from its three required collaborators.
    pub fn builder(
        knowledge: Arc<KnowledgeBase>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> PipelineBuilder {
        PipelineBuilder {
            knowledge,
            embedder,
            generator,
            template: PromptTemplate::default(),
            assembler: ContextAssembler::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn embedder_model(&self) -> &str {
        self.embedder.model_name()
    }

    pub fn generator_model(&self) -> &str {
        self.generator.model_name()
    }

    /// Retrieve up to `k` documents with distances, without generating.
    pub async fn search(&self, question: &str, k: usize) -> Result<Vec<RetrievedDocument>> {
        retrieve_scored(
            question,
            k,
            self.embedder.as_ref(),
            self.knowledge.index(),
            self.knowledge.documents(),
        )
        .await
        .inspect_err(|e| error!(error = %e, "retrieval failed"))
    }

    /// Retrieve the configured top-K documents for `question`.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<Document>> {
        let hits = self.search(question, self.top_k).await?;
        Ok(hits.into_iter().map(|h| h.document).collect())
    }

    /// Render the generator input for already-retrieved documents.
    pub fn prompt_for(&self, documents: &[Document], question: &str) -> String {
        let context = self.assembler.assemble(documents);
        self.template.render(&context, question)
    }

    /// Answer `question` from the knowledge base.
    ///
    /// # Errors
    ///
    /// Any retrieval error, or [`RagError::Generation`] if the generator
    /// fails. No partial result is returned.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let documents = self.retrieve(question).await?;
        let prompt = self.prompt_for(&documents, question);
        debug!(
            source_count = documents.len(),
            prompt_chars = prompt.len(),
            "built prompt"
        );

        let answer = self.generator.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "generation failed");
            RagError::Generation(e)
        })?;

        info!(
            source_count = documents.len(),
            answer_chars = answer.len(),
            "answered question"
        );

        Ok(Answer {
            answer,
            sources: documents,
        })
    }
}

/// Builder for [`Pipeline`]. Optional settings default to top-K 2, the
/// default template, and unbounded passages.
pub struct PipelineBuilder {
    knowledge: Arc<KnowledgeBase>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    template: PromptTemplate,
    assembler: ContextAssembler,
    top_k: usize,
}

impl PipelineBuilder {
    pub fn top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    pub fn template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Bound each passage's content in the context block.
    pub fn max_passage_chars(mut self, max: Option<usize>) -> Self {
        self.assembler = ContextAssembler::new(max);
        self
    }

    /// Validate and produce the pipeline.
    ///
    /// # Errors
    ///
    /// - [`RagError::InvalidTopK`] if top-K is zero.
    /// - [`RagError::DimensionMismatch`] if the embedder's dimensionality
    ///   differs from the knowledge base index.
    pub fn build(self) -> Result<Pipeline> {
        if self.top_k == 0 {
            return Err(RagError::InvalidTopK);
        }
        if self.embedder.dims() != self.knowledge.dims() {
            return Err(RagError::DimensionMismatch {
                expected: self.knowledge.dims(),
                actual: self.embedder.dims(),
            });
        }

        Ok(Pipeline {
            knowledge: self.knowledge,
            embedder: self.embedder,
            generator: self.generator,
            template: self.template,
            assembler: self.assembler,
            top_k: self.top_k,
        })
    }
}
