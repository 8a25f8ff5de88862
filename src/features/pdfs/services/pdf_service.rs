use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::covers::CoverService;
use crate::features::pdfs::dtos::PdfUpload;
use crate::features::pdfs::models::Pdf;
use crate::modules::storage::ObjectStorage;
use crate::shared::constants::PDF_CONTENT_TYPE;
use crate::shared::text::sanitize_file_name;

const PDF_COLUMNS: &str = "id, uuid, cover_uuid, url, title, created_at";

/// Stored PDF exports, one per cover
pub struct PdfService {
    pool: PgPool,
    covers: Arc<CoverService>,
    storage: Arc<dyn ObjectStorage>,
}

impl PdfService {
    pub fn new(pool: PgPool, covers: Arc<CoverService>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self {
            pool,
            covers,
            storage,
        }
    }

    pub async fn find_by_cover(&self, cover_uuid: Uuid) -> Result<Option<Pdf>> {
        sqlx::query_as::<_, Pdf>(&format!(
            "SELECT {} FROM pdfs WHERE cover_uuid = $1",
            PDF_COLUMNS
        ))
        .bind(cover_uuid)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get pdf of cover {}: {:?}", cover_uuid, e);
            AppError::Database(e)
        })
    }

    /// Store the PDF for a cover. An existing PDF is returned untouched, so
    /// the second flag is true only when this call created it.
    pub async fn create(&self, upload: PdfUpload) -> Result<(Pdf, bool)> {
        upload.check()?;

        let cover = self
            .covers
            .find_by_uuid(upload.cover_uuid)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Cover {} not found", upload.cover_uuid)))?;

        if let Some(existing) = self.find_by_cover(cover.uuid).await? {
            return Ok((existing, false));
        }

        let pdf_uuid = upload.pdf_uuid.unwrap_or_else(Uuid::new_v4);
        let title = sanitize_file_name(upload.title.as_deref().unwrap_or(&cover.img_description));
        let key = self
            .storage
            .public_key(&format!("pdfs/{}-{}.pdf", title, pdf_uuid));
        let stored = self
            .storage
            .upload(&key, upload.data, PDF_CONTENT_TYPE)
            .await?;

        let inserted = sqlx::query_as::<_, Pdf>(&format!(
            r#"
            INSERT INTO pdfs (uuid, cover_uuid, url, title)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (cover_uuid) DO NOTHING
            RETURNING {}
            "#,
            PDF_COLUMNS
        ))
        .bind(pdf_uuid)
        .bind(cover.uuid)
        .bind(&stored.url)
        .bind(&title)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert pdf for cover {}: {:?}", cover.uuid, e);
            AppError::Database(e)
        })?;

        match inserted {
            Some(pdf) => {
                tracing::info!("Stored pdf {} for cover {}", pdf.uuid, cover.uuid);
                Ok((pdf, true))
            }
            None => {
                // Lost a race with a concurrent upload for the same cover
                if let Err(e) = self.storage.delete(&stored.key).await {
                    tracing::warn!("Failed to remove duplicate pdf {}: {}", stored.key, e);
                }
                let existing = self.find_by_cover(cover.uuid).await?.ok_or_else(|| {
                    AppError::Internal(format!("Pdf for cover {} vanished", cover.uuid))
                })?;
                Ok((existing, false))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CreditsConfig;
    use crate::features::covers::models::NewCover;
    use crate::features::users::UserService;
    use crate::modules::storage::fake::FakeStorage;
    use crate::shared::test_helpers::create_user;
    use serde_json::json;

    async fn seed_cover(pool: &PgPool) -> Uuid {
        UserService::new(pool.clone(), CreditsConfig::default())
            .ensure_user(&create_user("ada@example.com"))
            .await
            .unwrap();
        let uuid = Uuid::new_v4();
        CoverService::new(pool.clone())
            .insert(NewCover {
                uuid,
                slug: format!("fox-{}", &uuid.simple().to_string()[..8]),
                user_email: "ada@example.com".to_string(),
                img_description: "A fox: reading?".to_string(),
                original_description: None,
                img_size: "16:9".to_string(),
                img_url: "https://cdn.test/fox.png".to_string(),
                llm_name: "test/model".to_string(),
                llm_params: json!({}),
                category_id: None,
            })
            .await
            .unwrap();
        uuid
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_pdf_is_created_once_per_cover(pool: PgPool) {
        let cover_uuid = seed_cover(&pool).await;
        let storage = Arc::new(FakeStorage::default());
        let service = PdfService::new(
            pool.clone(),
            Arc::new(CoverService::new(pool)),
            Arc::clone(&storage) as Arc<dyn ObjectStorage>,
        );
        let pdf_uuid = Uuid::new_v4();
        let upload = PdfUpload {
            data: b"%PDF-1.7".to_vec(),
            content_type: "application/pdf".to_string(),
            cover_uuid,
            pdf_uuid: Some(pdf_uuid),
            title: None,
        };

        let (first, created) = service.create(upload.clone()).await.unwrap();
        assert!(created);
        assert_eq!(first.title, "A_fox_reading");
        assert!(first
            .url
            .ends_with(&format!("public/pdfs/A_fox_reading-{}.pdf", pdf_uuid)));

        let (second, created) = service.create(upload).await.unwrap();
        assert!(!created);
        assert_eq!(second.uuid, first.uuid);
        assert_eq!(storage.uploads.lock().unwrap().len(), 1);
    }
}
