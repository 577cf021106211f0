//! Free-text generation.

use async_trait::async_trait;

use crate::error::GenerationError;

/// Language model that answers a single text prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
