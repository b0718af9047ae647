//! Assistant pipeline orchestrator.
//!
//! [`Assistant`] wires the whole flow together. At startup it either loads
//! the persisted index or rebuilds it from the document collection
//! (chunk → embed → build → persist). At query time it runs
//! retrieve → assemble → generate → format and returns one [`Answer`] per
//! question.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use norma_rag::{Assistant, AssistantConfig, OpenAiChat, OpenAiEmbeddings};
//!
//! let assistant = Assistant::builder()
//!     .config(AssistantConfig::default())
//!     .embedding_provider(Arc::new(OpenAiEmbeddings::from_env()?))
//!     .generator(Arc::new(OpenAiChat::from_env()?))
//!     .init()
//!     .await?;
//!
//! let answer = assistant.answer("Qual a seção mínima do condutor?").await?;
//! println!("{}", answer.text);
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::answer::{Answer, AnswerFormatter};
use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::AssistantConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{AssistantError, Result};
use crate::generation::Generator;
use crate::index::VectorIndex;
use crate::loader;
use crate::prompt::PromptAssembler;
use crate::retriever::Retriever;

/// The assistant pipeline: one read-only index, one retriever, one
/// generator, constructed explicitly at startup and never mutated after.
pub struct Assistant {
    config: AssistantConfig,
    generator: Arc<dyn Generator>,
    retriever: Retriever,
    assembler: PromptAssembler,
    formatter: AnswerFormatter,
    index: Arc<VectorIndex>,
}

impl Assistant {
    /// Create a new [`AssistantBuilder`].
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Construct an assistant around an already built index.
    ///
    /// Used by tests and by ingestion paths that do not read PDFs from
    /// disk. [`AssistantBuilder::init`] is the usual entry point.
    pub fn with_index(
        config: AssistantConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn Generator>,
        index: VectorIndex,
    ) -> Self {
        let index = Arc::new(index);
        let retriever = Retriever::new(embedder, Arc::clone(&index), config.top_k);
        Self {
            config,
            generator,
            retriever,
            assembler: PromptAssembler::new(),
            formatter: AnswerFormatter::new(),
            index,
        }
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Return the index the assistant answers from.
    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Answer one question: retrieve → assemble → generate → format.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Service`] if the embedding or generation
    /// call fails. The caller reports the failure and keeps the loop
    /// running; a query turn never aborts the process.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let results = self.retriever.retrieve(question).await?;
        let prompt = self.assembler.assemble(question, &results);
        let raw_answer = self.generator.generate(&prompt).await?;
        let answer = self.formatter.format(&raw_answer, &results);

        info!(
            cited = answer.cited_sources.len(),
            refused = answer.is_refusal(),
            "answered question"
        );
        Ok(answer)
    }
}

/// Build the index from the document collection: load → chunk → embed →
/// build → persist.
///
/// A [`AssistantError::Service`] failure aborts the whole build so no
/// partial index is persisted.
async fn build_index(
    config: &AssistantConfig,
    embedder: &Arc<dyn EmbeddingProvider>,
) -> Result<VectorIndex> {
    let (documents, skipped) = loader::load_directory(&config.docs_dir)?;
    if skipped > 0 {
        warn!(skipped, "some documents were skipped during ingestion");
    }

    let chunker = FixedSizeChunker::new(config.chunk_size, config.chunk_overlap);
    let mut fragments = Vec::new();
    for document in &documents {
        let document_fragments = chunker.chunk(document);
        info!(
            document.id = %document.id,
            fragment_count = document_fragments.len(),
            "chunked document"
        );
        fragments.extend(document_fragments);
    }

    let texts: Vec<&str> = fragments.iter().map(|f| f.text.as_str()).collect();
    let embeddings = embedder.embed_batch(&texts).await.map_err(|e| {
        error!(error = %e, "embedding failed, aborting index build");
        e
    })?;
    for (fragment, embedding) in fragments.iter_mut().zip(embeddings) {
        fragment.embedding = embedding;
    }

    let index = VectorIndex::build(embedder.model_id(), fragments)?;
    index.persist(&config.index_dir)?;
    info!(
        document_count = documents.len(),
        fragment_count = index.len(),
        "built and persisted index"
    );
    Ok(index)
}

/// Builder for constructing an [`Assistant`].
#[derive(Default)]
pub struct AssistantBuilder {
    config: Option<AssistantConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generator: Option<Arc<dyn Generator>>,
}

impl AssistantBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AssistantConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the answer generator.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Validate the builder and initialize the assistant.
    ///
    /// If a persisted index exists at the configured location it is loaded
    /// and ingestion is skipped entirely; the index is not checked for
    /// freshness against the document collection (an accepted limitation).
    /// A corrupt or model-mismatched persisted index falls back to a full
    /// rebuild.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Config`] if a required field is missing,
    /// [`AssistantError::Ingestion`] if no document could be loaded, or
    /// [`AssistantError::Service`] if embedding the corpus fails.
    pub async fn init(self) -> Result<Assistant> {
        let config = self
            .config
            .ok_or_else(|| AssistantError::Config("config is required".to_string()))?;
        let embedder = self
            .embedding_provider
            .ok_or_else(|| AssistantError::Config("embedding_provider is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| AssistantError::Config("generator is required".to_string()))?;

        let index = if VectorIndex::exists(&config.index_dir) {
            match VectorIndex::load(&config.index_dir, embedder.model_id()) {
                Ok(index) => index,
                Err(e) => {
                    warn!(error = %e, "persisted index unusable, rebuilding from documents");
                    build_index(&config, &embedder).await?
                }
            }
        } else {
            info!(path = %config.index_dir.display(), "no persisted index, running full ingestion");
            build_index(&config, &embedder).await?
        };

        Ok(Assistant::with_index(config, embedder, generator, index))
    }
}
