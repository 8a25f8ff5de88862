use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::prompts::dtos::{OptimizePromptDto, OptimizedPromptDto};
use crate::features::prompts::services::PromptService;
use crate::shared::types::ApiResponse;

/// Optimize a prompt
///
/// Expands a short idea into a detailed image description. If the language
/// model is unavailable the prompt comes back unchanged with
/// `optimized: false`.
#[utoipa::path(
    post,
    path = "/api/prompts/optimize",
    request_body = OptimizePromptDto,
    responses(
        (status = 200, description = "Optimized prompt", body = ApiResponse<OptimizedPromptDto>),
        (status = 400, description = "Empty or overlong prompt")
    ),
    tag = "prompts"
)]
pub async fn optimize_prompt(
    State(service): State<Arc<PromptService>>,
    AppJson(dto): AppJson<OptimizePromptDto>,
) -> Result<Json<ApiResponse<OptimizedPromptDto>>> {
    dto.validate()?;
    let result = service.optimize(&dto.prompt).await;
    Ok(Json(ApiResponse::success(Some(result), None, None)))
}
