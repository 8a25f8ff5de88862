use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    Json,
};
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::pdfs::dtos::{PdfQuery, PdfResponseDto, PdfUpload, UploadPdfDto};
use crate::features::pdfs::services::PdfService;
use crate::shared::types::ApiResponse;

/// Get the stored PDF of a cover
///
/// `data` is null when no PDF has been stored yet.
#[utoipa::path(
    get,
    path = "/api/pdfs",
    params(PdfQuery),
    responses(
        (status = 200, description = "Stored PDF or null", body = ApiResponse<PdfResponseDto>),
    ),
    tag = "pdfs"
)]
pub async fn get_pdf(
    State(service): State<Arc<PdfService>>,
    Query(query): Query<PdfQuery>,
) -> Result<Json<ApiResponse<PdfResponseDto>>> {
    let pdf = service.find_by_cover(query.cover_uuid).await?;
    Ok(Json(ApiResponse::success(pdf.map(Into::into), None, None)))
}

fn parse_uuid(field: &str, text: &str) -> Result<Uuid> {
    Uuid::parse_str(text.trim())
        .map_err(|_| AppError::BadRequest(format!("{} must be a valid UUID", field)))
}

async fn read_upload(mut multipart: Multipart) -> Result<PdfUpload> {
    let mut file: Option<(Vec<u8>, String)> = None;
    let mut cover_uuid: Option<Uuid> = None;
    let mut pdf_uuid: Option<Uuid> = None;
    let mut title: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read pdf data: {}", e))
                })?;
                file = Some((data.to_vec(), content_type));
            }
            "cover_uuid" | "pdf_uuid" | "title" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read {} field: {}", name, e))
                })?;
                match name.as_str() {
                    "cover_uuid" => cover_uuid = Some(parse_uuid("cover_uuid", &text)?),
                    "pdf_uuid" if !text.trim().is_empty() => {
                        pdf_uuid = Some(parse_uuid("pdf_uuid", &text)?)
                    }
                    "title" if !text.trim().is_empty() => title = Some(text),
                    _ => {}
                }
            }
            _ => debug!("Ignoring unknown field: {}", name),
        }
    }

    let (data, content_type) =
        file.ok_or_else(|| AppError::BadRequest("pdf file is required".to_string()))?;
    let cover_uuid =
        cover_uuid.ok_or_else(|| AppError::BadRequest("cover_uuid is required".to_string()))?;

    Ok(PdfUpload {
        data,
        content_type,
        cover_uuid,
        pdf_uuid,
        title,
    })
}

/// Store the PDF of a cover
///
/// Created once per cover; later uploads return the stored PDF.
#[utoipa::path(
    post,
    path = "/api/pdfs",
    request_body(
        content = UploadPdfDto,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 200, description = "Stored PDF", body = ApiResponse<PdfResponseDto>),
        (status = 400, description = "Not a PDF, too large or missing fields"),
        (status = 401, description = "Sign in required"),
        (status = 404, description = "Cover not found")
    ),
    security(("bearer_auth" = [])),
    tag = "pdfs"
)]
pub async fn upload_pdf(
    user: AuthenticatedUser,
    State(service): State<Arc<PdfService>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PdfResponseDto>>> {
    let upload = read_upload(multipart).await?;
    let (pdf, created) = service.create(upload).await?;
    if created {
        tracing::info!("{} stored pdf {}", user.email, pdf.uuid);
    }
    Ok(Json(ApiResponse::success(Some(pdf.into()), None, None)))
}
