use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::checkout::{
    dtos as checkout_dtos, handlers as checkout_handlers, models as checkout_models,
};
use crate::features::covers::{
    dtos as covers_dtos, handlers as covers_handlers, models as covers_models,
};
use crate::features::pdfs::{dtos as pdfs_dtos, handlers as pdfs_handlers};
use crate::features::prompts::{dtos as prompts_dtos, handlers as prompts_handlers};
use crate::features::tags::{dtos as tags_dtos, handlers as tags_handlers};
use crate::features::users::{dtos as users_dtos, handlers as users_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Categories
        categories_handlers::list_categories,
        categories_handlers::category_tree,
        categories_handlers::list_parent_categories,
        categories_handlers::list_category_options,
        categories_handlers::get_category,
        categories_handlers::get_category_by_slug,
        categories_handlers::list_children,
        categories_handlers::list_ancestors,
        categories_handlers::create_category,
        categories_handlers::update_category,
        categories_handlers::delete_category,
        // Covers
        covers_handlers::list_covers,
        covers_handlers::count_covers,
        covers_handlers::get_cover,
        covers_handlers::generate_cover,
        covers_handlers::list_my_covers,
        covers_handlers::update_cover_status,
        // Tags
        tags_handlers::list_tags,
        tags_handlers::get_tag,
        tags_handlers::list_tag_covers,
        tags_handlers::create_tag,
        tags_handlers::rename_tag,
        tags_handlers::delete_tag,
        // PDFs
        pdfs_handlers::get_pdf,
        pdfs_handlers::upload_pdf,
        // Prompts
        prompts_handlers::optimize_prompt,
        // Users
        users_handlers::get_me,
        users_handlers::update_me,
        // Checkout
        checkout_handlers::create_checkout,
        checkout_handlers::confirm_checkout,
    ),
    components(
        schemas(
            Meta,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::ParentCategoryDto,
            categories_dtos::CategoryOptionDto,
            categories_dtos::CategoryTreeDto,
            categories_dtos::CreateCategoryDto,
            categories_dtos::UpdateCategoryDto,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<Vec<categories_dtos::ParentCategoryDto>>,
            ApiResponse<Vec<categories_dtos::CategoryOptionDto>>,
            ApiResponse<Vec<categories_dtos::CategoryTreeDto>>,
            // Covers
            covers_models::CoverStatus,
            covers_dtos::CoverAuthorDto,
            covers_dtos::CoverResponseDto,
            covers_dtos::CoverDetailDto,
            covers_dtos::GenerateCoverDto,
            covers_dtos::UpdateCoverStatusDto,
            covers_handlers::CoverCountDto,
            ApiResponse<covers_dtos::CoverResponseDto>,
            ApiResponse<Vec<covers_dtos::CoverResponseDto>>,
            ApiResponse<covers_dtos::CoverDetailDto>,
            ApiResponse<covers_handlers::CoverCountDto>,
            // Tags
            tags_dtos::TagResponseDto,
            tags_dtos::TagWithCountDto,
            tags_dtos::TagNameDto,
            ApiResponse<tags_dtos::TagResponseDto>,
            ApiResponse<Vec<tags_dtos::TagWithCountDto>>,
            // PDFs
            pdfs_dtos::PdfResponseDto,
            pdfs_dtos::UploadPdfDto,
            ApiResponse<pdfs_dtos::PdfResponseDto>,
            // Prompts
            prompts_dtos::OptimizePromptDto,
            prompts_dtos::OptimizedPromptDto,
            ApiResponse<prompts_dtos::OptimizedPromptDto>,
            // Users
            users_dtos::UserProfileDto,
            users_dtos::UpdateProfileDto,
            ApiResponse<users_dtos::UserProfileDto>,
            // Checkout
            checkout_models::OrderStatus,
            checkout_dtos::CreateCheckoutDto,
            checkout_dtos::CheckoutSessionDto,
            checkout_dtos::ConfirmCheckoutDto,
            checkout_dtos::ConfirmationDto,
            ApiResponse<checkout_dtos::CheckoutSessionDto>,
            ApiResponse<checkout_dtos::ConfirmationDto>,
        )
    ),
    tags(
        (name = "categories", description = "Category tree and breadcrumbs"),
        (name = "covers", description = "Generated covers: gallery, detail and generation"),
        (name = "tags", description = "Free-form cover tags"),
        (name = "pdfs", description = "PDF exports attached to covers"),
        (name = "prompts", description = "Prompt optimization"),
        (name = "users", description = "Signed-in user profile and credits"),
        (name = "checkout", description = "Credit purchases"),
        (name = "admin", description = "Moderation and catalogue management (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Covergen API",
        version = "0.1.0",
        description = "API documentation for the cover generator",
    )
)]
pub struct ApiDoc;

/// Adds the bearer JWT security scheme to the document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the document info with values from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/categories/tree",
            "/api/categories/{id}/ancestors",
            "/api/covers/generate",
            "/api/tags/{slug}/covers",
            "/api/pdfs",
            "/api/prompts/optimize",
            "/api/users/me",
            "/api/checkout/confirm",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_info_modifier_overrides_title() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Docs".into(),
            version: "9.9.9".into(),
            description: "internal".into(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Docs");
        assert_eq!(doc.info.version, "9.9.9");
    }
}
