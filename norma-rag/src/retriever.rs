//! Retrieval of relevant fragments for a question.

use std::sync::Arc;

use tracing::debug;

use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{AssistantError, Result};
use crate::index::VectorIndex;

/// Wraps a [`VectorIndex`] with a fixed top-k retrieval policy.
///
/// Each call embeds the question and searches the index independently;
/// nothing is cached, so calls are safe to repeat.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever over an index with a fixed `top_k`.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<VectorIndex>, top_k: usize) -> Self {
        Self { embedder, index, top_k }
    }

    /// Retrieve the fragments most relevant to `question`.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Service`] if embedding the question fails,
    /// or [`AssistantError::Pipeline`] if the search itself fails.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query_vector = self.embedder.embed(question).await?;
        if query_vector.len() != self.index.dimensions() && !self.index.is_empty() {
            return Err(AssistantError::Pipeline(format!(
                "query embedding has dimension {} but the index has dimension {}",
                query_vector.len(),
                self.index.dimensions()
            )));
        }
        let results = self.index.search(&query_vector, self.top_k)?;
        debug!(result_count = results.len(), top_k = self.top_k, "retrieved fragments");
        Ok(results)
    }
}
