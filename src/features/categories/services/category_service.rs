use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::categories::dtos::{
    CategoryOptionDto, CategoryResponseDto, CategoryTreeDto, CreateCategoryDto,
    ParentCategoryDto, UpdateCategoryDto,
};
use crate::features::categories::models::{Category, ParentCategory};
use crate::shared::text::compare_names;

const CATEGORY_COLUMNS: &str = "id, name, parent_id, level, preview_image, created_at, updated_at";

/// Service for category operations
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_all(&self) -> Result<Vec<Category>> {
        let mut categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories",
            CATEGORY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list categories: {:?}", e);
            AppError::Database(e)
        })?;

        // Collation-independent name order, see `compare_names`
        categories.sort_by(|a, b| {
            a.level
                .cmp(&b.level)
                .then_with(|| compare_names(&a.name, &b.name))
        });
        Ok(categories)
    }

    async fn find(&self, id: i64) -> Result<Option<Category>> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    /// All categories, ordered by level then name
    pub async fn list_flat(&self) -> Result<Vec<CategoryResponseDto>> {
        Ok(self.fetch_all().await?.into_iter().map(Into::into).collect())
    }

    /// All categories as a forest
    pub async fn list_tree(&self) -> Result<Vec<CategoryTreeDto>> {
        let tree = CategoryTreeDto::build_tree(self.fetch_all().await?);
        tracing::debug!(
            "Built category tree: {} roots, {} nodes",
            tree.len(),
            tree.iter().map(CategoryTreeDto::size).sum::<usize>()
        );
        Ok(tree)
    }

    /// Root categories with their number of direct children
    pub async fn list_parents(&self) -> Result<Vec<ParentCategoryDto>> {
        let mut parents = sqlx::query_as::<_, ParentCategory>(
            r#"
            SELECT c.id, c.name, c.preview_image,
                   (SELECT COUNT(*) FROM categories ch WHERE ch.parent_id = c.id) AS children_count
            FROM categories c
            WHERE c.parent_id IS NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list parent categories: {:?}", e);
            AppError::Database(e)
        })?;

        parents.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(parents.into_iter().map(Into::into).collect())
    }

    /// Flat list with names indented by depth, for select inputs
    pub async fn list_indented(&self) -> Result<Vec<CategoryOptionDto>> {
        Ok(self.fetch_all().await?.iter().map(Into::into).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<CategoryResponseDto> {
        self.find(id)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))
    }

    /// Look up a category by its slug, i.e. its name as it appears in a URL
    /// segment. The router has already percent-decoded it.
    pub async fn get_by_slug(&self, slug: &str) -> Result<CategoryResponseDto> {
        let name = slug.trim();
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE LOWER(name) = LOWER($1)",
            CATEGORY_COLUMNS
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get category by name: {:?}", e);
            AppError::Database(e)
        })?;

        category
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", name)))
    }

    /// Direct children, locale-sorted
    pub async fn children(&self, id: i64) -> Result<Vec<CategoryResponseDto>> {
        let mut children = sqlx::query_as::<_, Category>(&format!(
            "SELECT {} FROM categories WHERE parent_id = $1",
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list children of category {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        children.sort_by(|a, b| compare_names(&a.name, &b.name));
        Ok(children.into_iter().map(Into::into).collect())
    }

    /// Path from the root down to `id`, inclusive. Empty when `id` is unknown.
    ///
    /// The walk stops at a root or at the first category already on the path,
    /// so a corrupt parent cycle cannot loop forever.
    pub async fn ancestors(&self, id: i64) -> Result<Vec<CategoryResponseDto>> {
        let path = sqlx::query_as::<_, Category>(
            r#"
            WITH RECURSIVE path AS (
                SELECT id, name, parent_id, level, preview_image, created_at, updated_at,
                       0 AS depth, ARRAY[id] AS visited
                FROM categories
                WHERE id = $1
                UNION ALL
                SELECT c.id, c.name, c.parent_id, c.level, c.preview_image, c.created_at,
                       c.updated_at, p.depth + 1, p.visited || c.id
                FROM categories c
                JOIN path p ON c.id = p.parent_id
                WHERE NOT c.id = ANY(p.visited)
            )
            SELECT id, name, parent_id, level, preview_image, created_at, updated_at
            FROM path
            ORDER BY depth DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to resolve ancestors of category {}: {:?}", id, e);
            AppError::Database(e)
        })?;

        Ok(path.into_iter().map(Into::into).collect())
    }

    /// Level a category gets under `parent_id`
    async fn level_under(&self, parent_id: Option<i64>) -> Result<i32> {
        match parent_id {
            None => Ok(0),
            Some(pid) => self
                .find(pid)
                .await?
                .map(|p| p.level + 1)
                .ok_or_else(|| AppError::BadRequest(format!("Parent category {} not found", pid))),
        }
    }

    fn map_write_error(e: sqlx::Error, name: &str) -> AppError {
        if is_unique_violation(&e) {
            return AppError::Conflict(format!("Category '{}' already exists", name));
        }
        tracing::error!("Failed to write category: {:?}", e);
        AppError::Database(e)
    }

    pub async fn create(&self, dto: CreateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim();
        let level = self.level_under(dto.parent_id).await?;

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            INSERT INTO categories (name, parent_id, level, preview_image)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(name)
        .bind(dto.parent_id)
        .bind(level)
        .bind(&dto.preview_image)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(e, name))?;

        tracing::info!("Created category {} ({})", category.id, category.name);
        Ok(category.into())
    }

    /// Whether `candidate` sits somewhere below `id`
    async fn is_descendant(&self, id: i64, candidate: i64) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            WITH RECURSIVE sub AS (
                SELECT id, ARRAY[$1::BIGINT, id] AS visited FROM categories WHERE parent_id = $1
                UNION ALL
                SELECT c.id, s.visited || c.id
                FROM categories c
                JOIN sub s ON c.parent_id = s.id
                WHERE NOT c.id = ANY(s.visited)
            )
            SELECT EXISTS (SELECT 1 FROM sub WHERE id = $2)
            "#,
        )
        .bind(id)
        .bind(candidate)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to check category descendants: {:?}", e);
            AppError::Database(e)
        })
    }

    pub async fn update(&self, id: i64, dto: UpdateCategoryDto) -> Result<CategoryResponseDto> {
        let name = dto.name.trim();
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category {} not found", id)))?;

        if let Some(parent_id) = dto.parent_id {
            if parent_id == id || self.is_descendant(id, parent_id).await? {
                return Err(AppError::BadRequest(
                    "A category cannot be moved under itself or its descendants".to_string(),
                ));
            }
        }
        let level = self.level_under(dto.parent_id).await?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let category = sqlx::query_as::<_, Category>(&format!(
            r#"
            UPDATE categories
            SET name = $2, parent_id = $3, level = $4, preview_image = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            CATEGORY_COLUMNS
        ))
        .bind(id)
        .bind(name)
        .bind(dto.parent_id)
        .bind(level)
        .bind(&dto.preview_image)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| Self::map_write_error(e, name))?;

        // Re-derive levels below the moved node
        sqlx::query(
            r#"
            WITH RECURSIVE sub AS (
                SELECT id, $2::INT + 1 AS level, ARRAY[$1::BIGINT, id] AS visited
                FROM categories
                WHERE parent_id = $1
                UNION ALL
                SELECT c.id, s.level + 1, s.visited || c.id
                FROM categories c
                JOIN sub s ON c.parent_id = s.id
                WHERE NOT c.id = ANY(s.visited)
            )
            UPDATE categories c
            SET level = sub.level, updated_at = NOW()
            FROM sub
            WHERE c.id = sub.id AND c.level <> sub.level
            "#,
        )
        .bind(id)
        .bind(level)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update descendant levels: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit category update: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(category.into())
    }

    /// Delete a category that has no children. Covers in it become
    /// uncategorised.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let children = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories WHERE parent_id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count category children: {:?}", e);
            AppError::Database(e)
        })?;

        if children > 0 {
            return Err(AppError::Conflict(format!(
                "Category {} still has {} child categories",
                id, children
            )));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete category {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Category {} not found", id)));
        }

        tracing::info!("Deleted category {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_dto(name: &str, parent_id: Option<i64>) -> CreateCategoryDto {
        CreateCategoryDto {
            name: name.to_string(),
            parent_id,
            preview_image: None,
        }
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_ancestors_of_root_is_itself(pool: PgPool) {
        let service = CategoryService::new(pool);
        let root = service.create(create_dto("Nature", None)).await.unwrap();

        let path = service.ancestors(root.id).await.unwrap();

        assert_eq!(path.len(), 1);
        assert_eq!(path[0].id, root.id);
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_ancestors_root_first_and_levels_derived(pool: PgPool) {
        let service = CategoryService::new(pool);
        let root = service.create(create_dto("Nature", None)).await.unwrap();
        let mid = service.create(create_dto("Forest", Some(root.id))).await.unwrap();
        let leaf = service.create(create_dto("Pine", Some(mid.id))).await.unwrap();
        assert_eq!(leaf.level, 2);

        let path = service.ancestors(leaf.id).await.unwrap();
        let ids: Vec<i64> = path.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![root.id, mid.id, leaf.id]);

        assert!(service.ancestors(999_999).await.unwrap().is_empty());
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_deep_chain_keeps_full_path_and_levels(pool: PgPool) {
        let service = CategoryService::new(pool);
        let mut chain = vec![service.create(create_dto("Depth 0", None)).await.unwrap()];
        for depth in 1..40 {
            let parent = chain[depth - 1].id;
            let node = service
                .create(create_dto(&format!("Depth {}", depth), Some(parent)))
                .await
                .unwrap();
            chain.push(node);
        }
        let leaf = chain[39].clone();
        assert_eq!(leaf.level, 39);

        let path = service.ancestors(leaf.id).await.unwrap();
        assert_eq!(path.len(), 40);
        assert_eq!(path[0].id, chain[0].id);
        assert_eq!(path[0].parent_id, None);

        // Detach the second node; everything below it moves up one level
        let detached = UpdateCategoryDto {
            name: "Depth 1".to_string(),
            parent_id: None,
            preview_image: None,
        };
        service.update(chain[1].id, detached).await.unwrap();

        assert_eq!(service.get_by_id(leaf.id).await.unwrap().level, 38);
        let path = service.ancestors(leaf.id).await.unwrap();
        assert_eq!(path.len(), 39);
        assert_eq!(path[0].id, chain[1].id);
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_move_rejects_cycles_and_relevels(pool: PgPool) {
        let service = CategoryService::new(pool);
        let a = service.create(create_dto("A", None)).await.unwrap();
        let b = service.create(create_dto("B", Some(a.id))).await.unwrap();
        let c = service.create(create_dto("C", Some(b.id))).await.unwrap();
        let other = service.create(create_dto("Other", None)).await.unwrap();

        let under_descendant = UpdateCategoryDto {
            name: "A".to_string(),
            parent_id: Some(c.id),
            preview_image: None,
        };
        assert!(matches!(
            service.update(a.id, under_descendant).await,
            Err(AppError::BadRequest(_))
        ));

        let moved = UpdateCategoryDto {
            name: "A".to_string(),
            parent_id: Some(other.id),
            preview_image: None,
        };
        assert_eq!(service.update(a.id, moved).await.unwrap().level, 1);
        assert_eq!(service.get_by_id(c.id).await.unwrap().level, 3);

        assert!(matches!(service.delete(b.id).await, Err(AppError::Conflict(_))));
        service.delete(c.id).await.unwrap();
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_flat_list_orders_by_level_then_transliterated_name(pool: PgPool) {
        let service = CategoryService::new(pool);
        let zebra = service.create(create_dto("Zebra", None)).await.unwrap();
        service.create(create_dto("éclair", None)).await.unwrap();
        service.create(create_dto("Apple", Some(zebra.id))).await.unwrap();
        service.create(create_dto("fig", None)).await.unwrap();

        let names: Vec<String> = service
            .list_flat()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["éclair", "fig", "Zebra", "Apple"]);
    }

    #[sqlx::test(migrator = "crate::core::database::MIGRATOR")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_name_lookup_is_case_insensitive(pool: PgPool) {
        let service = CategoryService::new(pool);
        service.create(create_dto("Line Art", None)).await.unwrap();

        let found = service.get_by_slug("line art").await.unwrap();
        assert_eq!(found.name, "Line Art");
        assert!(matches!(
            service.create(create_dto("LINE ART", None)).await,
            Err(AppError::Conflict(_))
        ));
    }
}
