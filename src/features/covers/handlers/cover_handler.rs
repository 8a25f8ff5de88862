use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::covers::dtos::{
    CoverDetailDto, CoverListQuery, CoverResponseDto, GenerateCoverDto, UpdateCoverStatusDto,
};
use crate::features::covers::models::CoverStatus;
use crate::features::covers::services::{CoverService, GenerationService};
use crate::shared::types::{ApiResponse, PaginationQuery};

/// State for protected cover handlers
#[derive(Clone)]
pub struct CoverState {
    pub covers: Arc<CoverService>,
    pub generation: Arc<GenerationService>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CoverCountDto {
    pub total: i64,
}

/// List visible covers
#[utoipa::path(
    get,
    path = "/api/covers",
    params(PaginationQuery, CoverListQuery),
    responses(
        (status = 200, description = "Page of covers", body = ApiResponse<Vec<CoverResponseDto>>),
    ),
    tag = "covers"
)]
pub async fn list_covers(
    State(service): State<Arc<CoverService>>,
    Query(page): Query<PaginationQuery>,
    Query(filter): Query<CoverListQuery>,
) -> Result<Json<ApiResponse<Vec<CoverResponseDto>>>> {
    let covers = match filter.category_id {
        Some(category_id) => service.list_by_category(category_id, &page).await?,
        None if filter.random => service.list_random(&page).await?,
        None => service.list(&page).await?,
    };
    Ok(Json(ApiResponse::page(
        covers.map(CoverResponseDto::from),
        &page,
    )))
}

/// Total number of generated covers
#[utoipa::path(
    get,
    path = "/api/covers/count",
    responses(
        (status = 200, description = "Cover count", body = ApiResponse<CoverCountDto>),
    ),
    tag = "covers"
)]
pub async fn count_covers(
    State(service): State<Arc<CoverService>>,
) -> Result<Json<ApiResponse<CoverCountDto>>> {
    let total = service.count_all().await?;
    Ok(Json(ApiResponse::success(Some(CoverCountDto { total }), None, None)))
}

/// Get cover detail by slug or uuid
///
/// When looked up by uuid, `redirect_to` carries the canonical slug path.
/// Hidden covers are only shown to their author and admins.
#[utoipa::path(
    get,
    path = "/api/covers/{identifier}",
    params(
        ("identifier" = String, Path, description = "Cover slug or uuid")
    ),
    responses(
        (status = 200, description = "Cover found", body = ApiResponse<CoverDetailDto>),
        (status = 404, description = "Cover not found")
    ),
    tag = "covers"
)]
pub async fn get_cover(
    viewer: Option<AuthenticatedUser>,
    State(service): State<Arc<CoverService>>,
    Path(identifier): Path<String>,
) -> Result<Json<ApiResponse<CoverDetailDto>>> {
    let (cover, redirect_to) = service.find_by_identifier(&identifier).await?;

    let is_owner = viewer.as_ref().is_some_and(|v| v.email == cover.user_email);
    let is_admin = viewer.as_ref().is_some_and(AuthenticatedUser::is_admin);
    if cover.status == CoverStatus::Hidden && !is_owner && !is_admin {
        return Err(AppError::NotFound(format!("Cover '{}' not found", identifier)));
    }

    let tags = service.tags(cover.id).await?;
    let detail = CoverDetailDto {
        cover: cover.into(),
        tags: tags.into_iter().map(Into::into).collect(),
        is_owner,
        redirect_to,
    };
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Generate a cover
///
/// Consumes credits; responds with code -3 when the balance is too low.
#[utoipa::path(
    post,
    path = "/api/covers/generate",
    request_body = GenerateCoverDto,
    responses(
        (status = 200, description = "Cover generated", body = ApiResponse<CoverResponseDto>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Sign in required"),
        (status = 402, description = "Not enough credits"),
        (status = 502, description = "Image provider or storage failed")
    ),
    security(("bearer_auth" = [])),
    tag = "covers"
)]
pub async fn generate_cover(
    user: AuthenticatedUser,
    State(state): State<CoverState>,
    AppJson(dto): AppJson<GenerateCoverDto>,
) -> Result<Json<ApiResponse<CoverResponseDto>>> {
    dto.validate()?;
    let cover = state.generation.generate(&user, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(cover.into()),
        Some("Cover generated".to_string()),
        None,
    )))
}

/// List the caller's covers, hidden ones included
#[utoipa::path(
    get,
    path = "/api/users/me/covers",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Page of covers", body = ApiResponse<Vec<CoverResponseDto>>),
        (status = 401, description = "Sign in required")
    ),
    security(("bearer_auth" = [])),
    tag = "covers"
)]
pub async fn list_my_covers(
    user: AuthenticatedUser,
    State(state): State<CoverState>,
    Query(page): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CoverResponseDto>>>> {
    let covers = state.covers.list_by_user(&user.email, &page).await?;
    Ok(Json(ApiResponse::page(
        covers.map(CoverResponseDto::from),
        &page,
    )))
}

/// Show or hide a cover (admin only)
#[utoipa::path(
    patch,
    path = "/api/admin/covers/{uuid}/status",
    params(
        ("uuid" = Uuid, Path, description = "Cover uuid")
    ),
    request_body = UpdateCoverStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<CoverResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Cover not found")
    ),
    security(("bearer_auth" = [])),
    tag = "covers"
)]
pub async fn update_cover_status(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<CoverService>>,
    Path(uuid): Path<Uuid>,
    AppJson(dto): AppJson<UpdateCoverStatusDto>,
) -> Result<Json<ApiResponse<CoverResponseDto>>> {
    let cover = service.set_status(uuid, dto.status).await?;
    tracing::info!("{} set cover {} to {:?}", admin.email, uuid, dto.status);
    Ok(Json(ApiResponse::success(Some(cover.into()), None, None)))
}
