mod gemini;
mod prompt;

use async_trait::async_trait;

use crate::error::GenerationError;

pub use gemini::{GeminiConfig, GeminiGateway};
pub use prompt::{PromptIntent, build_prompt};

/// A single prompt/response round trip to a text-generation backend.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// # Errors
    ///
    /// Returns `GenerationError::MissingCredential` for a blank credential,
    /// `GenerationError::Api` when the backend refuses or returns nothing usable,
    /// and `GenerationError::Network` for transport failures.
    async fn generate(&self, credential: &str, prompt: &str) -> Result<String, GenerationError>;
}
