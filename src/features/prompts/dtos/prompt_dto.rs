use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::constants::MAX_DESCRIPTION_LENGTH;
use crate::shared::validation::not_blank;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
pub struct OptimizePromptDto {
    #[validate(
        length(max = MAX_DESCRIPTION_LENGTH, message = "must be at most 2000 characters"),
        custom(function = "not_blank", message = "must not be blank")
    )]
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OptimizedPromptDto {
    pub result: String,
    /// False when the optimizer failed and `result` is the input unchanged
    pub optimized: bool,
}
