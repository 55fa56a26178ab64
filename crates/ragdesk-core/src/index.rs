//! Exact nearest-neighbor vector index.
//!
//! [`VectorIndex`] stores one vector per corpus document, in document
//! order, and answers top-k queries by a linear scan under squared
//! Euclidean distance. It is built once and is read-only afterwards: there
//! is no insert or delete API, so a value of this type is always a fully
//! built index.
//!
//! # Ordering
//!
//! Results are ordered by ascending distance, ties broken by ascending
//! insertion index. The comparator is total (`f32::total_cmp`), so the
//! same query always yields the same ordered result.
//!
//! # Example
//!
//! ```rust
//! use ragdesk_core::index::VectorIndex;
//!
//! let index = VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
//! let hits = index.search(&[1.0, 0.0], 2).unwrap();
//! assert_eq!(hits[0].index, 0);
//! assert_eq!(hits[0].distance, 1.0);
//! assert_eq!(hits[1].distance, 181.0);
//! ```

use std::cmp::Ordering;

use serde::Serialize;

use crate::embedding::squared_l2;
use crate::error::{RagError, Result};

/// One search hit: the stored vector's insertion index and its squared
/// Euclidean distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

impl Neighbor {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.index.cmp(&other.index))
    }
}

/// Frozen, array-backed index of embedding vectors.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    dims: usize,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from vectors in document order.
    ///
    /// The dimensionality is taken from the first vector.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyCorpus`] if `vectors` is empty.
    /// - [`RagError::DimensionMismatch`] if any vector's length differs
    ///   from the first vector's length.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dims = match vectors.first() {
            Some(first) => first.len(),
            None => return Err(RagError::EmptyCorpus),
        };

        if let Some(bad) = vectors.iter().find(|v| v.len() != dims) {
            return Err(RagError::DimensionMismatch {
                expected: dims,
                actual: bad.len(),
            });
        }

        Ok(Self { dims, vectors })
    }

    /// Return the `min(k, len)` stored vectors nearest to `query`.
    ///
    /// A `k` larger than the index is clamped rather than rejected, and
    /// `k = 0` yields an empty result.
    ///
    /// # Errors
    ///
    /// [`RagError::DimensionMismatch`] if `query.len()` differs from the
    /// index dimensionality.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dims {
            return Err(RagError::DimensionMismatch {
                expected: self.dims,
                actual: query.len(),
            });
        }

        let k = k.min(self.vectors.len());
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut hits: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| Neighbor {
                index,
                distance: squared_l2(query, v),
            })
            .collect();

        // Partition so the k best are in front, then order just those.
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, Neighbor::rank_cmp);
            hits.truncate(k);
        }
        hits.sort_by(Neighbor::rank_cmp);

        Ok(hits)
    }

    /// Number of stored vectors (equals the corpus size).
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Always false for an index returned by [`build`](VectorIndex::build).
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Vector dimensionality `D`.
    pub fn dims(&self) -> usize {
        self.dims
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(hits: &[Neighbor]) -> Vec<usize> {
        hits.iter().map(|h| h.index).collect()
    }

    #[test]
    fn test_build_empty_fails() {
        let err = VectorIndex::build(Vec::new()).unwrap_err();
        assert!(matches!(err, RagError::EmptyCorpus));
    }

    #[test]
    fn test_build_dimension_mismatch() {
        let err = VectorIndex::build(vec![vec![0.0, 0.0], vec![1.0, 2.0, 3.0]]).unwrap_err();
        match err {
            RagError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_records_dims_and_len() {
        let index = VectorIndex::build(vec![vec![1.0; 4], vec![2.0; 4], vec![3.0; 4]]).unwrap();
        assert_eq!(index.dims(), 4);
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(indices(&hits), vec![0, 1]);
        assert_eq!(hits[0].distance, 1.0);
        assert_eq!(hits[1].distance, 181.0);
    }

    #[test]
    fn test_search_top_one() {
        let index = VectorIndex::build(vec![vec![0.0, 0.0], vec![10.0, 10.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn test_search_tie_prefers_lower_index() {
        let index = VectorIndex::build(vec![vec![1.0, 1.0], vec![1.0, 1.0]]).unwrap();
        let hits = index.search(&[0.0, 0.0], 1).unwrap();
        assert_eq!(indices(&hits), vec![0]);

        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(indices(&hits), vec![0, 1]);
        assert_eq!(hits[0].distance, hits[1].distance);
    }

    #[test]
    fn test_search_tie_among_many_with_partition() {
        // Equidistant points on both sides of the query; the partition step
        // must not disturb the id tie-break.
        let index = VectorIndex::build(vec![
            vec![5.0],
            vec![-1.0],
            vec![1.0],
            vec![-1.0],
            vec![1.0],
        ])
        .unwrap();
        let hits = index.search(&[0.0], 3).unwrap();
        assert_eq!(indices(&hits), vec![1, 2, 3]);
    }

    #[test]
    fn test_search_k_clamped_to_len() {
        let index = VectorIndex::build(vec![vec![0.0], vec![1.0], vec![2.0]]).unwrap();
        let hits = index.search(&[0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(indices(&hits), vec![0, 1, 2]);
    }

    #[test]
    fn test_search_k_zero_is_empty() {
        let index = VectorIndex::build(vec![vec![0.0]]).unwrap();
        assert!(index.search(&[0.0], 0).unwrap().is_empty());
    }

    #[test]
    fn test_search_query_dimension_mismatch() {
        let index = VectorIndex::build(vec![vec![0.0, 0.0]]).unwrap();
        let err = index.search(&[0.0, 0.0, 0.0], 1).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_search_is_repeatable() {
        let index = VectorIndex::build(vec![
            vec![0.2, 0.9],
            vec![0.4, 0.1],
            vec![0.9, 0.9],
            vec![0.4, 0.1],
        ])
        .unwrap();
        let first = index.search(&[0.3, 0.3], 3).unwrap();
        for _ in 0..10 {
            assert_eq!(index.search(&[0.3, 0.3], 3).unwrap(), first);
        }
    }
}
