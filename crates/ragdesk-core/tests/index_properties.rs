//! Property tests for exact vector search ordering.

use ragdesk_core::embedding::squared_l2;
use ragdesk_core::index::VectorIndex;
use proptest::prelude::*;

const DIM: usize = 4;

/// Small integer-valued components make exact ties common.
fn arb_vector() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec((-3i8..=3).prop_map(f32::from), DIM)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn results_sorted_by_distance_then_index(
        vectors in proptest::collection::vec(arb_vector(), 1..30),
        query in arb_vector(),
        k in 1usize..40,
    ) {
        let index = VectorIndex::build(vectors.clone()).unwrap();
        let hits = index.search(&query, k).unwrap();

        prop_assert_eq!(hits.len(), k.min(vectors.len()));
        for pair in hits.windows(2) {
            let ordered = pair[0].distance < pair[1].distance
                || (pair[0].distance == pair[1].distance && pair[0].index < pair[1].index);
            prop_assert!(ordered, "out of order: {:?}", pair);
        }
        for hit in &hits {
            prop_assert_eq!(hit.distance, squared_l2(&query, &vectors[hit.index]));
        }
    }

    #[test]
    fn results_match_full_sort_prefix(
        vectors in proptest::collection::vec(arb_vector(), 1..30),
        query in arb_vector(),
        k in 1usize..40,
    ) {
        let index = VectorIndex::build(vectors.clone()).unwrap();
        let hits = index.search(&query, k).unwrap();

        let mut expected: Vec<(f32, usize)> = vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (squared_l2(&query, v), i))
            .collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        expected.truncate(k);

        let got: Vec<usize> = hits.iter().map(|h| h.index).collect();
        let want: Vec<usize> = expected.iter().map(|(_, i)| *i).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn search_is_deterministic(
        vectors in proptest::collection::vec(arb_vector(), 1..30),
        query in arb_vector(),
        k in 1usize..10,
    ) {
        let index = VectorIndex::build(vectors).unwrap();
        let first = index.search(&query, k).unwrap();
        let second = index.search(&query, k).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn oversized_k_returns_whole_index(
        vectors in proptest::collection::vec(arb_vector(), 1..30),
        query in arb_vector(),
        extra in 0usize..100,
    ) {
        let n = vectors.len();
        let index = VectorIndex::build(vectors).unwrap();
        let hits = index.search(&query, n + extra).unwrap();
        prop_assert_eq!(hits.len(), n);
    }

    #[test]
    fn wrong_query_length_is_rejected(
        vectors in proptest::collection::vec(arb_vector(), 1..10),
        len in (0usize..12).prop_filter("differs from DIM", |l| *l != DIM),
    ) {
        let index = VectorIndex::build(vectors).unwrap();
        let query = vec![0.0f32; len];
        prop_assert!(index.search(&query, 1).is_err());
    }
}
