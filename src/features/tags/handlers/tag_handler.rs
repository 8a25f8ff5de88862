use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::covers::dtos::CoverResponseDto;
use crate::features::tags::dtos::{TagNameDto, TagResponseDto, TagWithCountDto};
use crate::features::tags::services::TagService;
use crate::shared::types::{ApiResponse, PaginationQuery};

/// List all tags with cover counts
#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "Tags ordered by name", body = ApiResponse<Vec<TagWithCountDto>>),
    ),
    tag = "tags"
)]
pub async fn list_tags(
    State(service): State<Arc<TagService>>,
) -> Result<Json<ApiResponse<Vec<TagWithCountDto>>>> {
    let tags = service.list_with_counts().await?;
    let dtos = tags.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(Some(dtos), None, None)))
}

/// Get tag by slug
#[utoipa::path(
    get,
    path = "/api/tags/{slug}",
    params(
        ("slug" = String, Path, description = "URL-encoded tag name")
    ),
    responses(
        (status = 200, description = "Tag found", body = ApiResponse<TagResponseDto>),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn get_tag(
    State(service): State<Arc<TagService>>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    let tag = service.get_by_slug(&slug).await?;
    Ok(Json(ApiResponse::success(Some(tag.into()), None, None)))
}

/// Visible covers with a tag
#[utoipa::path(
    get,
    path = "/api/tags/{slug}/covers",
    params(
        ("slug" = String, Path, description = "URL-encoded tag name"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Covers, newest first", body = ApiResponse<Vec<CoverResponseDto>>),
        (status = 404, description = "Tag not found")
    ),
    tag = "tags"
)]
pub async fn list_tag_covers(
    State(service): State<Arc<TagService>>,
    Path(slug): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CoverResponseDto>>>> {
    let (_tag, covers) = service.covers_by_tag(&slug, &query).await?;
    Ok(Json(ApiResponse::page(
        covers.map(CoverResponseDto::from),
        &query,
    )))
}

/// Create a tag (admin only)
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = TagNameDto,
    responses(
        (status = 200, description = "Tag created", body = ApiResponse<TagResponseDto>),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Tag already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "tags"
)]
pub async fn create_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<TagService>>,
    AppJson(dto): AppJson<TagNameDto>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    dto.validate()?;
    let tag = service.create(&dto.name).await?;
    Ok(Json(ApiResponse::success(
        Some(tag.into()),
        Some("Tag created".to_string()),
        None,
    )))
}

/// Rename a tag (admin only)
#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    request_body = TagNameDto,
    responses(
        (status = 200, description = "Tag renamed", body = ApiResponse<TagResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Tag not found"),
        (status = 409, description = "Name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "tags"
)]
pub async fn rename_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<TagService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<TagNameDto>,
) -> Result<Json<ApiResponse<TagResponseDto>>> {
    dto.validate()?;
    let tag = service.rename(id, &dto.name).await?;
    Ok(Json(ApiResponse::success(Some(tag.into()), None, None)))
}

/// Delete a tag (admin only)
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(
        ("id" = i64, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Tag not found")
    ),
    security(("bearer_auth" = [])),
    tag = "tags"
)]
pub async fn delete_tag(
    RequireAdmin(_admin): RequireAdmin,
    State(service): State<Arc<TagService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Tag deleted".to_string()),
        None,
    )))
}
