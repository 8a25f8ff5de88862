use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::pdfs::models::Pdf;
use crate::shared::constants::{MAX_PDF_SIZE, PDF_CONTENT_TYPE};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PdfResponseDto {
    pub uuid: Uuid,
    pub cover_uuid: Uuid,
    pub url: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<Pdf> for PdfResponseDto {
    fn from(p: Pdf) -> Self {
        Self {
            uuid: p.uuid,
            cover_uuid: p.cover_uuid,
            url: p.url,
            title: p.title,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PdfQuery {
    pub cover_uuid: Uuid,
}

/// Multipart form for uploading a cover PDF (OpenAPI only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadPdfDto {
    /// The rendered PDF, at most 10 MB
    #[schema(format = Binary, content_media_type = "application/pdf")]
    pub pdf: String,
    pub cover_uuid: Uuid,
    /// Client-chosen id for the PDF; generated when absent
    pub pdf_uuid: Option<Uuid>,
    /// Used in the stored file name; defaults to the cover description
    pub title: Option<String>,
}

/// Parsed multipart upload
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub data: Vec<u8>,
    pub content_type: String,
    pub cover_uuid: Uuid,
    pub pdf_uuid: Option<Uuid>,
    pub title: Option<String>,
}

impl PdfUpload {
    /// Check type and size before anything is stored
    pub fn check(&self) -> Result<()> {
        let mime = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if !mime.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed, expected {}",
                self.content_type, PDF_CONTENT_TYPE
            )));
        }
        if self.data.is_empty() {
            return Err(AppError::BadRequest("PDF file is empty".to_string()));
        }
        if self.data.len() > MAX_PDF_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} MB",
                MAX_PDF_SIZE / 1024 / 1024
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: &str, size: usize) -> PdfUpload {
        PdfUpload {
            data: vec![b'%'; size],
            content_type: content_type.to_string(),
            cover_uuid: Uuid::new_v4(),
            pdf_uuid: None,
            title: None,
        }
    }

    #[test]
    fn test_upload_checks() {
        assert!(upload("application/pdf", 1024).check().is_ok());
        assert!(upload("Application/PDF; name=x.pdf", 1024).check().is_ok());
        assert!(upload("image/png", 1024).check().is_err());
        assert!(upload("application/pdf", 0).check().is_err());
        assert!(upload("application/pdf", MAX_PDF_SIZE).check().is_ok());
        assert!(upload("application/pdf", MAX_PDF_SIZE + 1).check().is_err());
    }
}
