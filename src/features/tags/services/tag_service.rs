use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::covers::models::Cover;
use crate::features::covers::CoverService;
use crate::features::tags::models::{Tag, TagWithCount};
use crate::shared::types::{Paginated, PaginationQuery};

/// Service for tags and cover tagging
pub struct TagService {
    pool: PgPool,
    covers: Arc<CoverService>,
}

impl TagService {
    pub fn new(pool: PgPool, covers: Arc<CoverService>) -> Self {
        Self { pool, covers }
    }

    /// Every tag with the number of covers carrying it
    pub async fn list_with_counts(&self) -> Result<Vec<TagWithCount>> {
        sqlx::query_as::<_, TagWithCount>(
            r#"
            SELECT t.id, t.name, COUNT(ct.cover_id) AS cover_count
            FROM tags t
            LEFT JOIN cover_tags ct ON ct.tag_id = t.id
            GROUP BY t.id, t.name
            ORDER BY t.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list tags: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Tag>> {
        sqlx::query_as::<_, Tag>("SELECT id, name, created_at, updated_at FROM tags WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get tag {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    /// Look up a tag by its slug, already percent-decoded by the router
    pub async fn get_by_slug(&self, slug: &str) -> Result<Tag> {
        sqlx::query_as::<_, Tag>(
            "SELECT id, name, created_at, updated_at FROM tags WHERE name = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get tag by name: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Tag '{}' not found", slug)))
    }

    /// Visible covers carrying the tag, newest first
    pub async fn covers_by_tag(
        &self,
        slug: &str,
        query: &PaginationQuery,
    ) -> Result<(Tag, Paginated<Cover>)> {
        let tag = self.get_by_slug(slug).await?;
        let covers = self.covers.list_by_tag(tag.id, query).await?;
        Ok((tag, covers))
    }

    /// Attach a tag to a cover. Returns false when it was already attached.
    pub async fn add_cover_tag(&self, cover_id: i64, tag_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO cover_tags (cover_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(cover_id)
        .bind(tag_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to tag cover {} with {}: {:?}", cover_id, tag_id, e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
        if is_unique_violation(&e) {
            return AppError::Conflict(format!("Tag '{}' already exists", name));
        }
        tracing::error!("Failed to write tag: {:?}", e);
        AppError::Database(e)
    }

    pub async fn create(&self, name: &str) -> Result<Tag> {
        let name = name.trim();
        let tag = sqlx::query_as::<_, Tag>(
            "INSERT INTO tags (name) VALUES ($1) RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, name))?;

        tracing::info!("Created tag {} ({})", tag.id, tag.name);
        Ok(tag)
    }

    pub async fn rename(&self, id: i64, name: &str) -> Result<Tag> {
        let name = name.trim();
        sqlx::query_as::<_, Tag>(
            r#"
            UPDATE tags SET name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, name))?
        .ok_or_else(|| AppError::NotFound(format!("Tag {} not found", id)))
    }

    /// Delete a tag and detach it from every cover
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete tag {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Tag {} not found", id)));
        }
        tracing::info!("Deleted tag {}", id);
        Ok(())
    }
}
