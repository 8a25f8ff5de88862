use std::sync::Arc;

use crate::features::prompts::dtos::OptimizedPromptDto;
use crate::modules::llm::PromptOptimizer;

pub struct PromptService {
    optimizer: Arc<dyn PromptOptimizer>,
}

impl PromptService {
    pub fn new(optimizer: Arc<dyn PromptOptimizer>) -> Self {
        Self { optimizer }
    }

    /// Expand `prompt`. Upstream failures fall back to the prompt as given.
    pub async fn optimize(&self, prompt: &str) -> OptimizedPromptDto {
        let prompt = prompt.trim();
        match self.optimizer.optimize(prompt).await {
            Ok(result) => OptimizedPromptDto {
                result,
                optimized: true,
            },
            Err(e) => {
                tracing::error!("Prompt optimisation failed, returning input: {}", e);
                OptimizedPromptDto {
                    result: prompt.to_string(),
                    optimized: false,
                }
            }
        }
    }
}
