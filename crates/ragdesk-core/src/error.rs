//! Error types for the `ragdesk-core` crate.

use thiserror::Error;

/// Errors that can occur while building or querying the retrieval pipeline.
///
/// `DimensionMismatch`, `EmptyCorpus`, `RetrievalEmpty`, `Template`,
/// `CorpusMismatch`, and `InvalidTopK` signal a broken invariant or a bad
/// configuration and are meant to abort startup. `Embedding` and
/// `Generation` wrap provider failures, which the core propagates as-is.
#[derive(Debug, Error)]
pub enum RagError {
    /// A vector's length differs from the index dimensionality.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimensionality fixed by the index (or declared by the embedder).
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },

    /// An index was built from an empty vector sequence.
    #[error("cannot build an index from an empty corpus")]
    EmptyCorpus,

    /// Retrieval was attempted against an empty index or corpus.
    #[error("retrieval attempted against an empty index")]
    RetrievalEmpty,

    /// A prompt template is missing a required placeholder.
    #[error("prompt template is missing the {placeholder} placeholder")]
    Template {
        /// The missing placeholder, braces included.
        placeholder: &'static str,
    },

    /// An index and a corpus of different sizes were paired.
    #[error("index holds {index_len} vectors but the corpus holds {corpus_len} documents")]
    CorpusMismatch { index_len: usize, corpus_len: usize },

    /// `top_k` must be at least 1.
    #[error("top_k must be greater than zero")]
    InvalidTopK,

    /// The embedding provider failed.
    #[error("embedding provider failed: {0}")]
    Embedding(#[source] anyhow::Error),

    /// The generation provider failed.
    #[error("generation provider failed: {0}")]
    Generation(#[source] anyhow::Error),
}

impl RagError {
    /// True for failures raised by an external provider rather than by a
    /// pipeline invariant.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, RagError::Embedding(_) | RagError::Generation(_))
    }
}

/// A convenience result type for core operations.
pub type Result<T> = std::result::Result<T, RagError>;
