//! Query-time retrieval: embed the question, search the index, and map
//! hits back to corpus documents.
//!
//! Retrieval is a pure function of its inputs plus one call into the
//! embedding provider. The ordering of the result is exactly the index's
//! ordering (ascending distance, then ascending document id).

use tracing::debug;

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::models::{Document, RetrievedDocument};

/// Retrieve the top-`k` documents for `question`, keeping distances.
///
/// # Errors
///
/// - [`RagError::RetrievalEmpty`] if the index or corpus is empty.
/// - [`RagError::Embedding`] if the provider fails.
/// - [`RagError::DimensionMismatch`] if the query vector has the wrong length.
/// - [`RagError::CorpusMismatch`] if a hit points past the end of `corpus`.
pub async fn retrieve_scored<E>(
    question: &str,
    k: usize,
    embedder: &E,
    index: &VectorIndex,
    corpus: &[Document],
) -> Result<Vec<RetrievedDocument>>
where
    E: Embedder + ?Sized,
{
    if index.is_empty() || corpus.is_empty() {
        return Err(RagError::RetrievalEmpty);
    }

    let query = embedder
        .embed(question)
        .await
        .map_err(RagError::Embedding)?;
    let hits = index.search(&query, k)?;

    let results = hits
        .into_iter()
        .map(|hit| {
            corpus
                .get(hit.index)
                .map(|doc| RetrievedDocument {
                    document: doc.clone(),
                    distance: hit.distance,
                })
                .ok_or(RagError::CorpusMismatch {
                    index_len: index.len(),
                    corpus_len: corpus.len(),
                })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(top_k = k, result_count = results.len(), "retrieved documents");
    Ok(results)
}

/// Retrieve the top-`k` documents for `question`, in ranking order.
///
/// Same algorithm and errors as [`retrieve_scored`], with distances dropped.
pub async fn retrieve<E>(
    question: &str,
    k: usize,
    embedder: &E,
    index: &VectorIndex,
    corpus: &[Document],
) -> Result<Vec<Document>>
where
    E: Embedder + ?Sized,
{
    let scored = retrieve_scored(question, k, embedder, index, corpus).await?;
    Ok(scored.into_iter().map(|r| r.document).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Returns the same query vector for every input.
    struct ConstEmbedder(Vec<f32>);

    #[async_trait]
    impl Embedder for ConstEmbedder {
        fn model_name(&self) -> &str {
            "const"
        }
        fn dims(&self) -> usize {
            self.0.len()
        }
        async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(self.0.clone())
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            Document::new(0, "Policy A", "Covers fire damage."),
            Document::new(1, "Policy B", "Covers theft."),
        ]
    }

    fn index() -> VectorIndex {
        VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_top_one() {
        let docs = retrieve("fire?", 1, &ConstEmbedder(vec![1.0, 0.0]), &index(), &corpus())
            .await
            .unwrap();
        assert_eq!(docs, vec![Document::new(0, "Policy A", "Covers fire damage.")]);
    }

    #[tokio::test]
    async fn test_retrieve_scored_keeps_order_and_distance() {
        let hits = retrieve_scored(
            "anything",
            5,
            &ConstEmbedder(vec![9.0, 9.0]),
            &index(),
            &corpus(),
        )
        .await
        .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document.title, "Policy B");
        assert_eq!(hits[0].distance, 2.0);
        assert_eq!(hits[1].document.title, "Policy A");
        assert_eq!(hits[1].distance, 162.0);
    }

    #[tokio::test]
    async fn test_retrieve_empty_corpus() {
        let err = retrieve("q", 1, &ConstEmbedder(vec![0.0, 0.0]), &index(), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::RetrievalEmpty));
    }

    #[tokio::test]
    async fn test_retrieve_query_dimension_drift() {
        let err = retrieve("q", 1, &ConstEmbedder(vec![0.0; 3]), &index(), &corpus())
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { .. }));
    }

    #[tokio::test]
    async fn test_retrieve_hit_outside_corpus() {
        let short = vec![Document::new(0, "Policy A", "Covers fire damage.")];
        let err = retrieve("q", 2, &ConstEmbedder(vec![0.0, 0.0]), &index(), &short)
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::CorpusMismatch { .. }));
    }
}
