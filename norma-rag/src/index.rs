//! In-memory vector index with cosine similarity search and disk persistence.
//!
//! The index is built once (or loaded from disk) before the query loop
//! starts and is read-only afterwards. Persistence uses two JSON artifacts
//! in one directory: `fragments.json` (model identity, dimensionality, and
//! fragment texts/metadata in vector order) and `vectors.json` (the
//! embeddings). Both must load together or the load fails.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::{Fragment, SearchResult};
use crate::error::{AssistantError, Result};

/// Name of the artifact holding fragment texts and metadata.
const FRAGMENTS_FILE: &str = "fragments.json";

/// Name of the artifact holding the embedding vectors.
const VECTORS_FILE: &str = "vectors.json";

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Serialized form of the fragment artifact.
#[derive(Serialize, Deserialize)]
struct FragmentsArtifact {
    model_id: String,
    dimensions: usize,
    fragments: Vec<FragmentRecord>,
}

/// One fragment's text and source metadata, stored in vector order.
#[derive(Serialize, Deserialize)]
struct FragmentRecord {
    document_id: String,
    text: String,
    start_offset: usize,
}

/// An insertion-ordered collection of embedded fragments with similarity
/// search over their vectors.
///
/// Every vector in the index was produced by one embedding model, recorded
/// as `model_id`; loading under a different model fails rather than
/// silently corrupting similarity scores.
pub struct VectorIndex {
    fragments: Vec<Fragment>,
    model_id: String,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index from embedded fragments.
    ///
    /// Fragment order is preserved; search ties are broken by this order.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Pipeline`] if any fragment is missing its
    /// embedding or has a dimensionality different from the first.
    pub fn build(model_id: impl Into<String>, fragments: Vec<Fragment>) -> Result<Self> {
        let dimensions = fragments.first().map(|f| f.embedding.len()).unwrap_or(0);
        for (i, fragment) in fragments.iter().enumerate() {
            if fragment.embedding.is_empty() {
                return Err(AssistantError::Pipeline(format!(
                    "fragment {i} from '{}' has no embedding",
                    fragment.document_id
                )));
            }
            if fragment.embedding.len() != dimensions {
                return Err(AssistantError::Pipeline(format!(
                    "fragment {i} has dimension {} but the index has dimension {dimensions}",
                    fragment.embedding.len()
                )));
            }
        }
        Ok(Self { fragments, model_id: model_id.into(), dimensions })
    }

    /// Number of fragments in the index.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the index holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// The identity of the embedding model the index was built with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// The dimensionality of the indexed vectors.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return the `top_k` fragments most similar to `query_vector`.
    ///
    /// Results are ordered by non-increasing cosine similarity; equal
    /// scores keep insertion order (the sort is stable). If the index holds
    /// fewer than `top_k` fragments, all of them are returned.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] if `top_k` is zero.
    pub fn search(&self, query_vector: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(AssistantError::Config("top_k must be greater than zero".to_string()));
        }

        let mut scored: Vec<SearchResult> = self
            .fragments
            .iter()
            .map(|fragment| SearchResult {
                fragment: fragment.clone(),
                score: cosine_similarity(&fragment.embedding, query_vector),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    /// Persist the index to a directory, all-or-nothing.
    ///
    /// Both artifacts are written into a scratch directory which is then
    /// promoted over `dir` with a rename, so an interrupted persist never
    /// leaves a partial index at the configured location.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Pipeline`] on serialization or I/O failure.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let scratch = dir.with_extension("tmp");
        let io_err = |e: std::io::Error| AssistantError::Pipeline(format!("index persist: {e}"));

        if scratch.exists() {
            fs::remove_dir_all(&scratch).map_err(io_err)?;
        }
        fs::create_dir_all(&scratch).map_err(io_err)?;

        let artifact = FragmentsArtifact {
            model_id: self.model_id.clone(),
            dimensions: self.dimensions,
            fragments: self
                .fragments
                .iter()
                .map(|f| FragmentRecord {
                    document_id: f.document_id.clone(),
                    text: f.text.clone(),
                    start_offset: f.start_offset,
                })
                .collect(),
        };
        let vectors: Vec<&[f32]> = self.fragments.iter().map(|f| f.embedding.as_slice()).collect();

        let ser_err = |e: serde_json::Error| AssistantError::Pipeline(format!("index persist: {e}"));
        fs::write(scratch.join(FRAGMENTS_FILE), serde_json::to_vec(&artifact).map_err(ser_err)?)
            .map_err(io_err)?;
        fs::write(scratch.join(VECTORS_FILE), serde_json::to_vec(&vectors).map_err(ser_err)?)
            .map_err(io_err)?;

        if dir.exists() {
            fs::remove_dir_all(dir).map_err(io_err)?;
        }
        fs::rename(&scratch, dir).map_err(io_err)?;

        info!(path = %dir.display(), fragment_count = self.fragments.len(), "persisted index");
        Ok(())
    }

    /// Whether a persisted index exists at `dir`.
    pub fn exists(dir: &Path) -> bool {
        dir.join(FRAGMENTS_FILE).exists()
    }

    /// Load a persisted index from a directory.
    ///
    /// A loaded index is indistinguishable from the in-memory index that
    /// was persisted: same fragments, same order, same search results.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::IndexCorruption`] if either artifact is
    /// missing or unreadable, if the two artifacts disagree on fragment
    /// count or dimensionality, or if the index was built with a model
    /// other than `expected_model`.
    pub fn load(dir: &Path, expected_model: &str) -> Result<Self> {
        let corrupt = |m: String| AssistantError::IndexCorruption(m);

        let fragments_raw = fs::read(dir.join(FRAGMENTS_FILE))
            .map_err(|e| corrupt(format!("cannot read {FRAGMENTS_FILE}: {e}")))?;
        let vectors_raw = fs::read(dir.join(VECTORS_FILE))
            .map_err(|e| corrupt(format!("cannot read {VECTORS_FILE}: {e}")))?;

        let artifact: FragmentsArtifact = serde_json::from_slice(&fragments_raw)
            .map_err(|e| corrupt(format!("cannot parse {FRAGMENTS_FILE}: {e}")))?;
        let vectors: Vec<Vec<f32>> = serde_json::from_slice(&vectors_raw)
            .map_err(|e| corrupt(format!("cannot parse {VECTORS_FILE}: {e}")))?;

        if artifact.model_id != expected_model {
            return Err(corrupt(format!(
                "index was built with embedding model '{}' but '{expected_model}' is active; \
                 a full rebuild is required",
                artifact.model_id
            )));
        }
        if artifact.fragments.len() != vectors.len() {
            return Err(corrupt(format!(
                "{} fragments but {} vectors",
                artifact.fragments.len(),
                vectors.len()
            )));
        }
        if vectors.iter().any(|v| v.len() != artifact.dimensions) {
            return Err(corrupt(format!(
                "vector dimensionality differs from recorded {}",
                artifact.dimensions
            )));
        }

        let fragments = artifact
            .fragments
            .into_iter()
            .zip(vectors)
            .map(|(record, embedding)| Fragment {
                document_id: record.document_id,
                text: record.text,
                start_offset: record.start_offset,
                embedding,
            })
            .collect::<Vec<_>>();

        info!(path = %dir.display(), fragment_count = fragments.len(), "loaded persisted index");

        Ok(Self { fragments, model_id: artifact.model_id, dimensions: artifact.dimensions })
    }
}
