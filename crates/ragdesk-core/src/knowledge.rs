//! The corpus paired with its frozen vector index.
//!
//! A [`KnowledgeBase`] is created once at startup and shared read-only
//! (behind an `Arc`) by every request. Its constructor is the only place
//! documents are embedded.

use tracing::info;

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::models::Document;

/// Corpus documents and their index, with `index.len() == documents.len()`.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    documents: Vec<Document>,
    index: VectorIndex,
}

impl KnowledgeBase {
    /// Embed every document's content, in document order, and build the
    /// index over the resulting vectors.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyCorpus`] if `documents` is empty.
    /// - [`RagError::Embedding`] if the provider fails.
    /// - [`RagError::CorpusMismatch`] if the provider returns the wrong
    ///   number of vectors.
    /// - [`RagError::DimensionMismatch`] if vectors disagree in length, or
    ///   their length differs from [`Embedder::dims`].
    pub async fn build<E>(documents: Vec<Document>, embedder: &E) -> Result<Self>
    where
        E: Embedder + ?Sized,
    {
        if documents.is_empty() {
            return Err(RagError::EmptyCorpus);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .await
            .map_err(RagError::Embedding)?;

        if vectors.len() != documents.len() {
            return Err(RagError::CorpusMismatch {
                index_len: vectors.len(),
                corpus_len: documents.len(),
            });
        }

        let index = VectorIndex::build(vectors)?;
        if index.dims() != embedder.dims() {
            return Err(RagError::DimensionMismatch {
                expected: embedder.dims(),
                actual: index.dims(),
            });
        }

        info!(
            document_count = documents.len(),
            dims = index.dims(),
            model = embedder.model_name(),
            "built vector index"
        );

        Ok(Self { documents, index })
    }

    /// Pair an already-built index with its corpus.
    ///
    /// # Errors
    ///
    /// [`RagError::CorpusMismatch`] if the sizes differ.
    pub fn from_parts(documents: Vec<Document>, index: VectorIndex) -> Result<Self> {
        if index.len() != documents.len() {
            return Err(RagError::CorpusMismatch {
                index_len: index.len(),
                corpus_len: documents.len(),
            });
        }
        Ok(Self { documents, index })
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dims(&self) -> usize {
        self.index.dims()
    }
}
