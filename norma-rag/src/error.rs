//! Error types for the `norma-rag` crate.

use thiserror::Error;

/// Errors that can occur across the assistant pipeline.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// A document (or the whole document collection) failed to load.
    ///
    /// Individual unreadable documents are skipped with a warning during
    /// ingestion; this variant surfaces only when the collection itself is
    /// missing or every document failed.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// An embedding or generation service call failed (network, auth, quota).
    #[error("Service error ({provider}): {message}")]
    Service {
        /// The external service that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The persisted index is missing an artifact, unreadable, or was built
    /// with a different embedding model. Callers fall back to a full rebuild.
    #[error("Index corruption: {0}")]
    IndexCorruption(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
