use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::covers::CoverService;
use crate::features::users::dtos::{UpdateProfileDto, UserProfileDto};
use crate::features::users::services::UserService;
use crate::shared::types::ApiResponse;

/// State for user handlers
#[derive(Clone)]
pub struct UserState {
    pub users: Arc<UserService>,
    pub covers: Arc<CoverService>,
}

/// Get current user's profile and credit balance
///
/// The account is created with the starting credits on first call.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserProfileDto>),
        (status = 401, description = "Sign in required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(state): State<UserState>,
) -> Result<Json<ApiResponse<UserProfileDto>>> {
    let account = state.users.ensure_user(&user).await?;
    let covers_count = state.covers.count_by_user(&user.email).await?;
    Ok(Json(ApiResponse::success(
        Some(UserProfileDto::new(account, covers_count)),
        None,
        None,
    )))
}

/// Update nickname or avatar
#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ApiResponse<UserProfileDto>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Sign in required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_me(
    user: AuthenticatedUser,
    State(state): State<UserState>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<UserProfileDto>>> {
    dto.validate()?;
    state.users.ensure_user(&user).await?;
    let account = state.users.update_profile(&user.email, dto).await?;
    let covers_count = state.covers.count_by_user(&user.email).await?;
    Ok(Json(ApiResponse::success(
        Some(UserProfileDto::new(account, covers_count)),
        None,
        None,
    )))
}
