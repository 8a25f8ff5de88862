use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::CategoryService;
use crate::features::covers::dtos::GenerateCoverDto;
use crate::features::covers::models::{Cover, NewCover};
use crate::features::covers::services::CoverService;
use crate::features::tags::models::Tag;
use crate::features::tags::TagService;
use crate::features::users::UserService;
use crate::modules::generation::{GeneratedImage, ImageGenerator};
use crate::modules::storage::{ObjectStorage, StoredObject};
use crate::shared::prompts::render_cover_prompt;
use crate::shared::text::cover_slug;

/// Generates covers: charges credits, calls the image provider, stores the
/// result and records it.
pub struct GenerationService {
    users: Arc<UserService>,
    covers: Arc<CoverService>,
    categories: Arc<CategoryService>,
    tags: Arc<TagService>,
    generator: Arc<dyn ImageGenerator>,
    storage: Arc<dyn ObjectStorage>,
}

impl GenerationService {
    pub fn new(
        users: Arc<UserService>,
        covers: Arc<CoverService>,
        categories: Arc<CategoryService>,
        tags: Arc<TagService>,
        generator: Arc<dyn ImageGenerator>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            users,
            covers,
            categories,
            tags,
            generator,
            storage,
        }
    }

    pub async fn generate(&self, user: &AuthenticatedUser, dto: GenerateCoverDto) -> Result<Cover> {
        let description = dto.description.trim().to_string();

        let category = match dto.category_id {
            Some(id) => Some(self.categories.get_by_id(id).await.map_err(|e| match e {
                AppError::NotFound(_) => AppError::BadRequest(format!("Category {} not found", id)),
                other => other,
            })?),
            None => None,
        };
        let tag = match dto.tag_id {
            Some(id) => Some(
                self.tags
                    .find_by_id(id)
                    .await?
                    .ok_or_else(|| AppError::BadRequest(format!("Tag {} not found", id)))?,
            ),
            None => None,
        };

        self.users.ensure_user(user).await?;
        let cost = self.users.credits_per_generation();
        self.users.consume_credits(&user.email, cost).await?;

        let uuid = Uuid::new_v4();
        let category_name = category.as_ref().map(|c| c.name.as_str());
        let tag_name = tag.as_ref().map(|t| t.name.as_str());

        let (image, stored) = match self.render(uuid, &description, category_name, tag_name).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!("Generation for {} failed, refunding: {}", user.email, e);
                self.refund(&user.email, cost).await;
                return Err(e);
            }
        };

        let mut params = image.params;
        if let Value::Object(map) = &mut params {
            map.insert("source_url".to_string(), Value::from(image.url));
        }

        let stored_key = stored.key.clone();
        let inserted = self
            .covers
            .insert(NewCover {
                uuid,
                slug: cover_slug(&description, &uuid),
                user_email: user.email.clone(),
                img_description: description,
                original_description: dto
                    .original_description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                img_size: image.size,
                img_url: stored.url,
                llm_name: image.model,
                llm_params: params,
                category_id: category.as_ref().map(|c| c.id),
            })
            .await;

        // Nothing was recorded, so the charge goes back; the object stays
        let cover = match inserted {
            Ok(cover) => cover,
            Err(e) => {
                tracing::warn!(
                    "Saving cover for {} failed, refunding; orphaned object {}: {}",
                    user.email,
                    stored_key,
                    e
                );
                self.refund(&user.email, cost).await;
                return Err(e);
            }
        };

        if let Some(tag) = tag {
            self.attach_tag(&cover, &tag).await;
        }

        Ok(cover)
    }

    /// Prompt, generate, download and re-upload
    async fn render(
        &self,
        uuid: Uuid,
        description: &str,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> Result<(GeneratedImage, StoredObject)> {
        let prompt = render_cover_prompt(description, category, tag)
            .map_err(|e| AppError::Internal(format!("Failed to render cover prompt: {}", e)))?;

        let image = self.generator.generate(&prompt).await?;
        let downloaded = self.generator.download(&image.url).await?;

        let key = self
            .storage
            .public_key(&format!("covers/{}.{}", uuid, downloaded.extension()));
        let stored = self
            .storage
            .upload(&key, downloaded.bytes, &downloaded.content_type)
            .await?;

        Ok((image, stored))
    }

    async fn refund(&self, email: &str, cost: i32) {
        if let Err(e) = self.users.refund_credits(email, cost).await {
            tracing::error!("Failed to refund {} credits to {}: {}", cost, email, e);
        }
    }

    // The cover already exists at this point; a tagging failure is logged and
    // left as is.
    async fn attach_tag(&self, cover: &Cover, tag: &Tag) {
        if let Err(e) = self.tags.add_cover_tag(cover.id, tag.id).await {
            tracing::warn!("Cover {} saved without tag {}: {}", cover.uuid, tag.name, e);
        }
    }
}
