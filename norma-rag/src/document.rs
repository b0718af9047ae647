//! Data types for documents, fragments, and search results.

use serde::{Deserialize, Serialize};

/// A source document with its extracted text.
///
/// The `id` is the source filename including its extension (e.g. `NBR-5410.pdf`)
/// and is the citation identity surfaced to the end user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (source filename).
    pub id: String,
    /// The extracted text content, pages concatenated in order.
    pub text: String,
}

impl Document {
    /// Create a new document from an id and its text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// A bounded slice of a [`Document`]'s text, the atomic retrieval unit.
///
/// The embedding is attached by the ingestion pipeline after chunking;
/// an empty vector means the fragment has not been embedded yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Fragment {
    /// The ID of the source [`Document`].
    pub document_id: String,
    /// The text content of the fragment.
    pub text: String,
    /// Offset of the fragment within the document text, in characters.
    pub start_offset: usize,
    /// The vector embedding for this fragment's text.
    pub embedding: Vec<f32>,
}

/// A retrieved [`Fragment`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved fragment.
    pub fragment: Fragment,
    /// The cosine similarity score (higher is more relevant).
    pub score: f32,
}
