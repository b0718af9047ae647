//! Configuration for the assistant pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, Result};

/// Configuration parameters for the assistant pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// Maximum fragment size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive fragments.
    pub chunk_overlap: usize,
    /// Number of fragments retrieved per question.
    pub top_k: usize,
    /// Identifier of the embedding model.
    pub embedding_model: String,
    /// Identifier of the generation model.
    pub generation_model: String,
    /// Directory holding the source PDF documents.
    pub docs_dir: PathBuf,
    /// Directory holding the persisted index artifacts.
    pub index_dir: PathBuf,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
            top_k: 4,
            embedding_model: "text-embedding-ada-002".to_string(),
            generation_model: "gpt-4".to_string(),
            docs_dir: PathBuf::from("docs"),
            index_dir: PathBuf::from("vectorstore/index"),
        }
    }
}

impl AssistantConfig {
    /// Create a new builder for constructing an [`AssistantConfig`].
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`AssistantConfig`].
#[derive(Debug, Clone, Default)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    /// Set the maximum fragment size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive fragments in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of fragments retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the generation model identifier.
    pub fn generation_model(mut self, model: impl Into<String>) -> Self {
        self.config.generation_model = model.into();
        self
    }

    /// Set the directory holding the source PDF documents.
    pub fn docs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.docs_dir = dir.into();
        self
    }

    /// Set the directory holding the persisted index artifacts.
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    /// Build the [`AssistantConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    pub fn build(self) -> Result<AssistantConfig> {
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(AssistantError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(AssistantError::Config("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AssistantConfig::default();
        assert!(config.chunk_overlap < config.chunk_size);
        assert!(config.top_k >= 1);
    }

    #[test]
    fn builder_rejects_overlap_not_less_than_size() {
        let result = AssistantConfig::builder().chunk_size(100).chunk_overlap(100).build();
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }

    #[test]
    fn builder_rejects_zero_top_k() {
        let result = AssistantConfig::builder().top_k(0).build();
        assert!(matches!(result, Err(AssistantError::Config(_))));
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = AssistantConfig::builder()
            .chunk_size(800)
            .chunk_overlap(80)
            .top_k(6)
            .docs_dir("normas")
            .build()
            .unwrap();
        assert_eq!(config.chunk_size, 800);
        assert_eq!(config.chunk_overlap, 80);
        assert_eq!(config.top_k, 6);
        assert_eq!(config.docs_dir, PathBuf::from("normas"));
        assert_eq!(config.generation_model, "gpt-4");
    }
}
