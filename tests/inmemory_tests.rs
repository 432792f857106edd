//! Property tests for in-memory vector store search ordering.

use docrag::document::Chunk;
use docrag::inmemory::InMemoryVectorStore;
use docrag::vectorstore::{EmbeddedChunk, VectorStore};
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate an embedded chunk with a normalized embedding.
fn arb_embedded_chunk(dim: usize) -> impl Strategy<Value = EmbeddedChunk> {
    ("[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(|(text, embedding)| {
        EmbeddedChunk {
            chunk: Chunk {
                text,
                source: "doc_1".to_string(),
                page: Some(1),
                sequence_index: 0,
            },
            embedding,
        }
    })
}

/// For any set of stored embeddings, search returns results ordered by
/// ascending cosine distance, bounded by both `k` and the store size.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded_by_k(
            entries in proptest::collection::vec(arb_embedded_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let stored = entries.len();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.insert(entries).await.unwrap();
                store.search(&query, k).await.unwrap()
            });

            // Result count is at most k and at most the number of stored chunks
            prop_assert!(results.len() <= k);
            prop_assert!(results.len() <= stored);

            // Results are ordered by ascending distance
            for window in results.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }

            // Cosine distance of non-zero vectors stays within [0, 2]
            for result in &results {
                prop_assert!(result.distance >= -1e-6);
                prop_assert!(result.distance <= 2.0 + 1e-6);
            }
        }
    }
}

/// Re-inserting the same entries grows the store rather than overwriting;
/// search over the doubled store still respects the `k` bound.
mod prop_insert_appends {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn duplicate_inserts_accumulate(
            entries in proptest::collection::vec(arb_embedded_chunk(DIM), 1..10),
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let stored = entries.len();
            let count = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.insert(entries.clone()).await.unwrap();
                store.insert(entries).await.unwrap();
                store.count().await.unwrap()
            });

            prop_assert_eq!(count, stored * 2);
        }
    }
}
