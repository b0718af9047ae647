//! Property and round-trip tests for the vector index.

use norma_rag::document::Fragment;
use norma_rag::error::AssistantError;
use norma_rag::index::VectorIndex;
use proptest::prelude::*;

const DIM: usize = 16;
const MODEL: &str = "mock-embedding-model";

fn fragment(doc: &str, text: &str, embedding: Vec<f32>) -> Fragment {
    Fragment { document_id: doc.to_string(), text: text.to_string(), start_offset: 0, embedding }
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of embedded fragments, search returns results ordered by
    /// descending cosine similarity, bounded by both top_k and the number
    /// of indexed fragments.
    #[test]
    fn results_ordered_descending_and_bounded_by_top_k(
        embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let count = embeddings.len();
        let fragments: Vec<Fragment> = embeddings
            .into_iter()
            .enumerate()
            .map(|(i, embedding)| fragment(&format!("doc{i}.pdf"), "trecho", embedding))
            .collect();

        let index = VectorIndex::build(MODEL, fragments).unwrap();
        let results = index.search(&query, top_k).unwrap();

        prop_assert!(results.len() <= top_k);
        prop_assert!(results.len() <= count);
        if count < top_k {
            prop_assert_eq!(results.len(), count);
        }

        for window in results.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }
}

#[test]
fn persisted_index_round_trips_search_results() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("index");

    let fragments = vec![
        fragment("A.pdf", "primeiro trecho da norma", vec![0.7, 0.3, 0.1, 0.4]),
        fragment("A.pdf", "segundo trecho da norma", vec![0.1, 0.9, 0.2, 0.0]),
        fragment("B.pdf", "trecho de outra norma", vec![0.3, 0.3, 0.8, 0.1]),
    ];
    let index = VectorIndex::build(MODEL, fragments).unwrap();
    index.persist(&location).unwrap();

    let loaded = VectorIndex::load(&location, MODEL).unwrap();
    assert_eq!(loaded.len(), index.len());
    assert_eq!(loaded.model_id(), MODEL);

    let query = [0.5, 0.2, 0.6, 0.3];
    let before = index.search(&query, 3).unwrap();
    let after = loaded.search(&query, 3).unwrap();

    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.fragment, a.fragment);
        assert_eq!(b.score, a.score);
    }
}

#[test]
fn load_fails_when_one_artifact_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("index");

    let index =
        VectorIndex::build(MODEL, vec![fragment("A.pdf", "trecho", vec![1.0, 0.0])]).unwrap();
    index.persist(&location).unwrap();

    std::fs::remove_file(location.join("vectors.json")).unwrap();
    let result = VectorIndex::load(&location, MODEL);
    assert!(matches!(result, Err(AssistantError::IndexCorruption(_))));
}

#[test]
fn load_fails_on_garbled_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("index");

    let index =
        VectorIndex::build(MODEL, vec![fragment("A.pdf", "trecho", vec![1.0, 0.0])]).unwrap();
    index.persist(&location).unwrap();

    std::fs::write(location.join("fragments.json"), b"{ not json").unwrap();
    let result = VectorIndex::load(&location, MODEL);
    assert!(matches!(result, Err(AssistantError::IndexCorruption(_))));
}

#[test]
fn load_rejects_an_index_built_with_another_model() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("index");

    let index =
        VectorIndex::build(MODEL, vec![fragment("A.pdf", "trecho", vec![1.0, 0.0])]).unwrap();
    index.persist(&location).unwrap();

    let result = VectorIndex::load(&location, "other-embedding-model");
    assert!(matches!(result, Err(AssistantError::IndexCorruption(_))));
}

#[test]
fn persist_replaces_a_previous_index_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("index");

    let old =
        VectorIndex::build(MODEL, vec![fragment("old.pdf", "antigo", vec![1.0, 0.0])]).unwrap();
    old.persist(&location).unwrap();

    let new = VectorIndex::build(
        MODEL,
        vec![
            fragment("novo.pdf", "novo trecho", vec![0.0, 1.0]),
            fragment("novo.pdf", "outro trecho", vec![1.0, 1.0]),
        ],
    )
    .unwrap();
    new.persist(&location).unwrap();

    let loaded = VectorIndex::load(&location, MODEL).unwrap();
    assert_eq!(loaded.len(), 2);
    let results = loaded.search(&[0.0, 1.0], 5).unwrap();
    assert!(results.iter().all(|r| r.fragment.document_id == "novo.pdf"));
    assert!(!location.with_extension("tmp").exists());
}
