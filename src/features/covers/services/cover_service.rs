use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::covers::models::{Cover, CoverStatus, NewCover};
use crate::features::tags::models::Tag;
use crate::shared::types::{Paginated, PaginationQuery};

const COVER_FIELDS: &str = r#"
    c.id, c.uuid, c.slug, c.user_email, c.img_description, c.original_description,
    c.img_size, c.img_url, c.llm_name, c.llm_params, c.status, c.category_id,
    c.created_at, c.updated_at,
    u.nickname AS user_nickname, u.avatar_url AS user_avatar_url,
    cat.name AS category_name
"#;

const VISIBLE: &str = "c.status = 'visible' AND $1::BIGINT IS NULL";

/// `SELECT` of joined cover rows, reading covers from `source`
fn select_from(source: &str) -> String {
    format!(
        r#"
        SELECT {}
        FROM {} c
        LEFT JOIN users u ON u.email = c.user_email
        LEFT JOIN categories cat ON cat.id = c.category_id
        "#,
        COVER_FIELDS, source
    )
}

/// Gallery ordering
#[derive(Debug, Clone, Copy)]
enum Order {
    Newest,
    Random,
}

impl Order {
    fn sql(self) -> &'static str {
        match self {
            Order::Newest => "c.created_at DESC, c.id DESC",
            Order::Random => "RANDOM()",
        }
    }
}

/// Service for cover records
pub struct CoverService {
    pool: PgPool,
}

impl CoverService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, cover: NewCover) -> Result<Cover> {
        let sql = format!(
            r#"
            WITH inserted AS (
                INSERT INTO covers (
                    uuid, slug, user_email, img_description, original_description,
                    img_size, img_url, llm_name, llm_params, status, category_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING *
            )
            {}
            "#,
            select_from("inserted")
        );

        let created = sqlx::query_as::<_, Cover>(&sql)
            .bind(cover.uuid)
            .bind(&cover.slug)
            .bind(&cover.user_email)
            .bind(&cover.img_description)
            .bind(&cover.original_description)
            .bind(&cover.img_size)
            .bind(&cover.img_url)
            .bind(&cover.llm_name)
            .bind(&cover.llm_params)
            .bind(CoverStatus::Visible)
            .bind(cover.category_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert cover {}: {:?}", cover.uuid, e);
                AppError::Database(e)
            })?;

        tracing::info!("Created cover {} for {}", created.uuid, created.user_email);
        Ok(created)
    }

    pub async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Cover>> {
        sqlx::query_as::<_, Cover>(&format!("{} WHERE c.uuid = $1", select_from("covers")))
            .bind(uuid)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get cover {}: {:?}", uuid, e);
                AppError::Database(e)
            })
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Cover>> {
        sqlx::query_as::<_, Cover>(&format!("{} WHERE c.slug = $1", select_from("covers")))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get cover by slug: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Resolve a detail-page identifier. Slugs are tried first; a uuid hit
    /// also returns the canonical path the client should redirect to.
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<(Cover, Option<String>)> {
        if let Some(cover) = self.find_by_slug(identifier).await? {
            return Ok((cover, None));
        }

        let not_found = || AppError::NotFound(format!("Cover '{}' not found", identifier));
        let uuid = Uuid::parse_str(identifier).map_err(|_| not_found())?;
        let cover = self.find_by_uuid(uuid).await?.ok_or_else(not_found)?;
        let redirect = format!("/detail/{}", cover.slug);
        Ok((cover, Some(redirect)))
    }

    async fn page(
        &self,
        filter: &str,
        arg: Option<i64>,
        order: Order,
        query: &PaginationQuery,
    ) -> Result<Paginated<Cover>> {
        let count_sql = format!("SELECT COUNT(*) FROM covers c WHERE {}", filter);
        let list_sql = format!(
            "{} WHERE {} ORDER BY {} LIMIT $2 OFFSET $3",
            select_from("covers"),
            filter,
            order.sql()
        );

        // Filters read their argument as $1; unfiltered lists bind NULL
        let count = sqlx::query_scalar::<_, i64>(&count_sql)
            .bind(arg)
            .fetch_one(&self.pool);
        let items = sqlx::query_as::<_, Cover>(&list_sql)
            .bind(arg)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool);

        let (total, items) = tokio::try_join!(count, items).map_err(|e| {
            tracing::error!("Failed to list covers: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(Paginated { items, total })
    }

    /// Visible covers, newest first
    pub async fn list(&self, query: &PaginationQuery) -> Result<Paginated<Cover>> {
        self.page(VISIBLE, None, Order::Newest, query).await
    }

    /// Visible covers in random order
    pub async fn list_random(&self, query: &PaginationQuery) -> Result<Paginated<Cover>> {
        self.page(VISIBLE, None, Order::Random, query).await
    }

    pub async fn list_by_category(
        &self,
        category_id: i64,
        query: &PaginationQuery,
    ) -> Result<Paginated<Cover>> {
        self.page(
            "c.status = 'visible' AND c.category_id = $1",
            Some(category_id),
            Order::Newest,
            query,
        )
        .await
    }

    pub async fn list_by_tag(&self, tag_id: i64, query: &PaginationQuery) -> Result<Paginated<Cover>> {
        self.page(
            "c.status = 'visible' AND c.id IN (SELECT cover_id FROM cover_tags WHERE tag_id = $1)",
            Some(tag_id),
            Order::Newest,
            query,
        )
        .await
    }

    /// A user's own covers, hidden ones included
    pub async fn list_by_user(&self, email: &str, query: &PaginationQuery) -> Result<Paginated<Cover>> {
        let total = self.count_by_user(email).await?;
        let items = sqlx::query_as::<_, Cover>(&format!(
            "{} WHERE c.user_email = $1 ORDER BY {} LIMIT $2 OFFSET $3",
            select_from("covers"),
            Order::Newest.sql()
        ))
        .bind(email)
        .bind(query.limit())
        .bind(query.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list covers of {}: {:?}", email, e);
            AppError::Database(e)
        })?;

        Ok(Paginated { items, total })
    }

    pub async fn count_all(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM covers")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count covers: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn count_by_user(&self, email: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM covers WHERE user_email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count covers of {}: {:?}", email, e);
                AppError::Database(e)
            })
    }

    /// Tags attached to a cover, by name
    pub async fn tags(&self, cover_id: i64) -> Result<Vec<Tag>> {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.created_at, t.updated_at
            FROM tags t
            JOIN cover_tags ct ON ct.tag_id = t.id
            WHERE ct.cover_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(cover_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list tags of cover {}: {:?}", cover_id, e);
            AppError::Database(e)
        })
    }

    /// Show or hide a cover. Status is the only field that changes after
    /// creation.
    pub async fn set_status(&self, uuid: Uuid, status: CoverStatus) -> Result<Cover> {
        let sql = format!(
            r#"
            WITH updated AS (
                UPDATE covers SET status = $2, updated_at = NOW()
                WHERE uuid = $1
                RETURNING *
            )
            {}
            "#,
            select_from("updated")
        );

        let cover = sqlx::query_as::<_, Cover>(&sql)
            .bind(uuid)
            .bind(status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update status of cover {}: {:?}", uuid, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Cover {} not found", uuid)))?;

        tracing::info!("Cover {} is now {:?}", uuid, status);
        Ok(cover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CreditsConfig;
    use crate::features::users::UserService;
    use crate::shared::test_helpers::create_user;
    use crate::shared::text::cover_slug;
    use serde_json::json;

    fn new_cover(email: &str, description: &str, category_id: Option<i64>) -> NewCover {
        let uuid = Uuid::new_v4();
        NewCover {
            uuid,
            slug: cover_slug(description, &uuid),
            user_email: email.to_string(),
            img_description: description.to_string(),
            original_description: Some("fox".to_string()),
            img_size: "16:9".to_string(),
            img_url: format!("https://cdn.test/public/covers/{}.png", uuid),
            llm_name: "test/model".to_string(),
            llm_params: json!({ "aspect_ratio": "16:9" }),
            category_id,
        }
    }

    async fn seed_user(pool: &PgPool, email: &str) {
        UserService::new(pool.clone(), CreditsConfig::default())
            .ensure_user(&create_user(email))
            .await
            .unwrap();
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_insert_then_fetch_by_uuid(pool: PgPool) {
        seed_user(&pool, "ada@example.com").await;
        let service = CoverService::new(pool);
        let input = new_cover("ada@example.com", "A fox reading a book", None);

        let created = service.insert(input.clone()).await.unwrap();
        let fetched = service.find_by_uuid(input.uuid).await.unwrap().unwrap();

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.img_description, input.img_description);
        assert_eq!(fetched.original_description, input.original_description);
        assert_eq!(fetched.img_url, input.img_url);
        assert_eq!(fetched.category_id, input.category_id);
        assert_eq!(fetched.status, CoverStatus::Visible);
        assert_eq!(fetched.user_nickname.as_deref(), Some("Test User"));
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_identifier_lookup_and_redirect(pool: PgPool) {
        seed_user(&pool, "ada@example.com").await;
        let service = CoverService::new(pool);
        let cover = service
            .insert(new_cover("ada@example.com", "Quiet harbour", None))
            .await
            .unwrap();

        let (by_slug, redirect) = service.find_by_identifier(&cover.slug).await.unwrap();
        assert_eq!(by_slug.id, cover.id);
        assert!(redirect.is_none());

        let (by_uuid, redirect) = service
            .find_by_identifier(&cover.uuid.to_string())
            .await
            .unwrap();
        assert_eq!(by_uuid.id, cover.id);
        assert_eq!(redirect, Some(format!("/detail/{}", cover.slug)));

        assert!(matches!(
            service.find_by_identifier("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_hidden_covers_leave_the_gallery(pool: PgPool) {
        seed_user(&pool, "ada@example.com").await;
        let service = CoverService::new(pool);
        let a = service
            .insert(new_cover("ada@example.com", "First", None))
            .await
            .unwrap();
        service
            .insert(new_cover("ada@example.com", "Second", None))
            .await
            .unwrap();

        service.set_status(a.uuid, CoverStatus::Hidden).await.unwrap();

        let page = service.list(&PaginationQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].img_description, "Second");
        assert_eq!(service.count_all().await.unwrap(), 2);
        assert_eq!(service.count_by_user("ada@example.com").await.unwrap(), 2);
    }
}
