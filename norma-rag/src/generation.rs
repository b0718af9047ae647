//! Generator trait for producing answer text from an assembled prompt.

use async_trait::async_trait;

use crate::error::Result;

/// A generative language model invoked with a fully assembled prompt.
///
/// One request, one response; no streaming. Retry, timeout, and
/// cancellation are the caller's concern.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate the raw answer text for the given prompt.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Service`](crate::AssistantError::Service)
    /// if the backing service call fails.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Return the identity of the generation model.
    fn model_id(&self) -> &str;
}
