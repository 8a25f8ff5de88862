//! Text model used to expand short prompts before image generation.

mod chat_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use chat_client::ChatCompletionsClient;

#[async_trait]
pub trait PromptOptimizer: Send + Sync {
    /// Rewrite `prompt` into a richer description of the scene.
    async fn optimize(&self, prompt: &str) -> Result<String, AppError>;
}

#[cfg(test)]
pub mod fake {
    use super::*;

    pub struct FakeOptimizer {
        pub fail: bool,
    }

    #[async_trait]
    impl PromptOptimizer for FakeOptimizer {
        async fn optimize(&self, prompt: &str) -> Result<String, AppError> {
            if self.fail {
                return Err(AppError::ExternalServiceError("llm down".into()));
            }
            Ok(format!("{}, in a sunlit meadow", prompt))
        }
    }
}
