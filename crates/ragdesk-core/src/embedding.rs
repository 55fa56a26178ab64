//! Embedding provider trait and vector utilities.
//!
//! Defines the [`Embedder`] trait that all embedding backends implement,
//! plus the distance function used by the vector index.
//!
//! Concrete provider implementations (OpenAI, Ollama, fastembed, tract)
//! live in the `ragdesk` app crate.

use async_trait::async_trait;

/// Trait for embedding providers.
///
/// An embedder maps text to a vector of fixed dimensionality. It is
/// expected to be deterministic for a given model. Failures are reported
/// as [`anyhow::Error`] and wrapped by the pipeline into
/// [`RagError::Embedding`](crate::RagError::Embedding).
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;

    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed a batch of texts, returning one vector per input in order.
    ///
    /// The default implementation calls [`embed`](Embedder::embed)
    /// sequentially. Backends with native batching should override it.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

/// Squared Euclidean distance between two vectors of equal length.
///
/// Callers are responsible for checking lengths; extra components in the
/// longer slice are ignored.
///
/// ```text
/// d(a, b) = Σ (aᵢ − bᵢ)²
/// ```
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2_zero_for_identical() {
        let v = vec![1.0, -2.0, 3.5];
        assert_eq!(squared_l2(&v, &v), 0.0);
    }

    #[test]
    fn test_squared_l2_known_values() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(squared_l2(&[10.0, 10.0], &[1.0, 0.0]), 181.0);
    }

    #[test]
    fn test_squared_l2_symmetric() {
        let a = [0.3, -1.2, 4.0];
        let b = [2.0, 0.5, -1.0];
        assert_eq!(squared_l2(&a, &b), squared_l2(&b, &a));
    }

    #[test]
    fn test_squared_l2_empty() {
        assert_eq!(squared_l2(&[], &[]), 0.0);
    }
}
