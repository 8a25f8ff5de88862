use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Public category routes
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/categories", get(handlers::list_categories))
        .route("/api/categories/tree", get(handlers::category_tree))
        .route("/api/categories/parents", get(handlers::list_parent_categories))
        .route("/api/categories/options", get(handlers::list_category_options))
        .route("/api/categories/slug/{slug}", get(handlers::get_category_by_slug))
        .route("/api/categories/{id}", get(handlers::get_category))
        .route("/api/categories/{id}/children", get(handlers::list_children))
        .route("/api/categories/{id}/ancestors", get(handlers::list_ancestors))
        .with_state(service)
}

/// Admin category routes
///
/// Requires the auth middleware to be applied by the caller
pub fn admin_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route("/api/admin/categories", post(handlers::create_category))
        .route(
            "/api/admin/categories/{id}",
            put(handlers::update_category).delete(handlers::delete_category),
        )
        .with_state(service)
}
