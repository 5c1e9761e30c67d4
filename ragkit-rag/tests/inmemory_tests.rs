//! Property tests for in-memory search, embedding shape and prompt merging.

use std::collections::HashMap;

use proptest::prelude::*;
use ragkit_core::{Message, Role};
use ragkit_rag::{Embedder, HashingEmbedder, InMemoryVectorStore, PromptMerger, Vector, VectorStore};

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

/// Generate a vector whose content is recorded in metadata.
fn arb_vector(dim: usize) -> impl Strategy<Value = Vector> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, values)| Vector::from_document(&ragkit_rag::Document::new(id, text), values),
    )
}

/// Search results are ordered by descending score (ties by ascending id) and
/// never exceed `top_k` or the number of distinct ids stored.
mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            vectors in proptest::collection::vec(arb_vector(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (results, unique_count, stored) = rt.block_on(async {
                let store = InMemoryVectorStore::new(DIM);
                store.upsert(&vectors).await.unwrap();

                let unique: HashMap<&str, ()> = vectors.iter().map(|v| (v.id.as_str(), ())).collect();
                let results = store.query_by_vector(&query, top_k).await.unwrap();
                (results, unique.len(), store.len().await)
            });

            // Upserting a repeated id replaces the earlier vector
            prop_assert_eq!(stored, unique_count);

            prop_assert!(results.len() <= top_k);
            prop_assert_eq!(results.len(), top_k.min(unique_count));

            for window in results.windows(2) {
                prop_assert!(
                    window[0].score > window[1].score
                        || (window[0].score == window[1].score && window[0].id < window[1].id),
                    "results not in order: ({}, {}) then ({}, {})",
                    window[0].id,
                    window[0].score,
                    window[1].id,
                    window[1].score,
                );
            }
        }
    }
}

/// The hashing embedder returns one vector per input, each of the configured dimension.
mod prop_embedding_shape {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn one_vector_per_text_with_fixed_dimension(
            texts in proptest::collection::vec("[a-zA-Z0-9 ]{0,40}", 0..10),
            dim in 1usize..128,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let embeddings = rt.block_on(async {
                let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
                HashingEmbedder::new(dim).embed_strings(&refs).await.unwrap()
            });

            prop_assert_eq!(embeddings.len(), texts.len());
            prop_assert!(embeddings.iter().all(|v| v.len() == dim));
        }
    }
}

/// Merging never touches the system message or the message count, and the
/// rewritten user message always carries both the query and the knowledge.
mod prop_merge_preserves_structure {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn system_untouched_and_user_rewritten(
            system in "[a-zA-Z .]{0,40}",
            query in "[a-zA-Z ?]{1,40}",
            knowledge in "[a-zA-Z0-9 :\n]{0,80}",
        ) {
            let messages = vec![Message::system(system.clone()), Message::user(query.clone())];
            let merged = PromptMerger::new().merge(messages, &knowledge).unwrap();

            prop_assert_eq!(merged.len(), 2);
            prop_assert_eq!(&merged[0], &Message::system(system));
            prop_assert_eq!(merged[1].role, Role::User);
            let expected_prefix = format!("user query: {query}\nContext knowledge: {knowledge}\n");
            prop_assert!(merged[1].content.starts_with(&expected_prefix));
        }
    }
}
