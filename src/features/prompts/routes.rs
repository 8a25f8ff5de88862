use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::prompts::handlers;
use crate::features::prompts::services::PromptService;

pub fn routes(service: Arc<PromptService>) -> Router {
    Router::new()
        .route("/api/prompts/optimize", post(handlers::optimize_prompt))
        .with_state(service)
}
