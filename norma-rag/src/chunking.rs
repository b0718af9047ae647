//! Document chunking.
//!
//! Splits a [`Document`]'s text into overlapping fixed-size [`Fragment`]s.
//! Fragment boundaries are measured in characters, not bytes — the corpus
//! is Portuguese text full of multi-byte code points.

use crate::document::{Document, Fragment};

/// A strategy for splitting documents into fragments.
///
/// Implementations produce [`Fragment`]s with text and source metadata but
/// no embeddings; embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into fragments.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    fn chunk(&self, document: &Document) -> Vec<Fragment>;
}

/// Splits text into fixed-size fragments by character count with overlap.
///
/// Consecutive fragments overlap by exactly `chunk_overlap` characters, so
/// information spanning a fragment boundary appears whole in at least one
/// fragment. A document shorter than `chunk_size` yields a single fragment
/// equal to the whole text.
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per fragment
    /// * `chunk_overlap` — characters shared between consecutive fragments;
    ///   must be less than `chunk_size` (enforced by the config builder)
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Fragment> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = document.text.chars().collect();
        let step = self.chunk_size.saturating_sub(self.chunk_overlap);
        let mut fragments = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            fragments.push(Fragment {
                document_id: document.id.clone(),
                text: chars[start..end].iter().collect(),
                start_offset: start,
                embedding: Vec::new(),
            });
            if end == chars.len() || step == 0 {
                break;
            }
            start += step;
        }

        fragments
    }
}
