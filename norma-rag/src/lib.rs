//! # norma-rag
//!
//! Retrieval-Augmented Generation pipeline for answering natural-language
//! questions over a fixed corpus of technical-standard PDF documents.
//!
//! Every answer is grounded in retrieved document fragments and carries a
//! citation naming its source documents; when no fragment supports the
//! question, the answer is the fixed refusal string
//! ([`REFUSAL`]), enforced by [`AnswerFormatter`] rather than trusted to
//! the generative model.
//!
//! The pipeline components:
//!
//! - [`FixedSizeChunker`] — splits documents into overlapping fragments
//! - [`EmbeddingProvider`] / [`Generator`] — external service seams, with
//!   OpenAI adapters in [`openai`]
//! - [`VectorIndex`] — cosine similarity search plus disk persistence
//! - [`Retriever`] — fixed top-k retrieval policy
//! - [`PromptAssembler`] — citation and refusal rules in the prompt
//! - [`AnswerFormatter`] — the authoritative cite-or-refuse enforcement
//! - [`Assistant`] — orchestrator with the load-or-build startup policy
//!
//! ## Known limitation
//!
//! A persisted index is loaded without any freshness check against the
//! document collection: changing the PDFs does not invalidate the index.
//! Delete the index directory to force a rebuild.

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod index;
pub mod loader;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use answer::{Answer, AnswerFormatter, REFUSAL};
pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{AssistantConfig, AssistantConfigBuilder};
pub use document::{Document, Fragment, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{AssistantError, Result};
pub use generation::Generator;
pub use index::VectorIndex;
pub use loader::load_directory;
pub use openai::{OpenAiChat, OpenAiEmbeddings};
pub use pipeline::{Assistant, AssistantBuilder};
pub use prompt::PromptAssembler;
pub use retriever::Retriever;
