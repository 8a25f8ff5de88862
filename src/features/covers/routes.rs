use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::features::covers::handlers::{self, CoverState};
use crate::features::covers::services::{CoverService, GenerationService};

/// Public cover routes
pub fn routes(service: Arc<CoverService>) -> Router {
    Router::new()
        .route("/api/covers", get(handlers::list_covers))
        .route("/api/covers/count", get(handlers::count_covers))
        .route("/api/covers/{identifier}", get(handlers::get_cover))
        .with_state(service)
}

/// Cover routes for signed-in users
///
/// Requires the auth middleware to be applied by the caller
pub fn protected_routes(covers: Arc<CoverService>, generation: Arc<GenerationService>) -> Router {
    let state = CoverState { covers, generation };

    Router::new()
        .route("/api/covers/generate", post(handlers::generate_cover))
        .route("/api/users/me/covers", get(handlers::list_my_covers))
        .with_state(state)
}

/// Admin cover routes
pub fn admin_routes(service: Arc<CoverService>) -> Router {
    Router::new()
        .route(
            "/api/admin/covers/{uuid}/status",
            patch(handlers::update_cover_status),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CreditsConfig;
    use crate::features::categories::CategoryService;
    use crate::features::tags::TagService;
    use crate::features::users::UserService;
    use crate::modules::generation::fake::FakeGenerator;
    use crate::modules::storage::fake::FakeStorage;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_auth};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn protected() -> Router {
        let pool = lazy_pool();
        let covers = Arc::new(CoverService::new(pool.clone()));
        let generation = Arc::new(GenerationService::new(
            Arc::new(UserService::new(pool.clone(), CreditsConfig::default())),
            Arc::clone(&covers),
            Arc::new(CategoryService::new(pool.clone())),
            Arc::new(TagService::new(pool, Arc::clone(&covers))),
            Arc::new(FakeGenerator::default()),
            Arc::new(FakeStorage::default()),
        ));
        protected_routes(covers, generation)
    }

    #[tokio::test]
    async fn test_generate_without_token_asks_to_sign_in() {
        let server = TestServer::new(protected()).unwrap();

        let response = server
            .post("/api/covers/generate")
            .json(&json!({ "description": "A fox" }))
            .await;

        response.assert_status_unauthorized();
        let body = response.json::<Value>();
        assert_eq!(body["code"], -2);
        assert_eq!(body["message"], "no auth");
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_description() {
        let app = with_auth(protected(), create_user("ada@example.com"));
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/covers/generate")
            .json(&json!({ "description": "   " }))
            .await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["code"], -1);
        assert_eq!(body["errors"], json!(["description: must not be blank"]));
    }

    #[tokio::test]
    async fn test_generate_rejects_missing_description() {
        let app = with_auth(protected(), create_user("ada@example.com"));
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/covers/generate")
            .json(&json!({ "category_id": 1 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["code"], -1);
    }

    #[tokio::test]
    async fn test_status_change_rejects_unknown_status() {
        let app = with_auth(
            admin_routes(Arc::new(CoverService::new(lazy_pool()))),
            crate::shared::test_helpers::create_admin_user(),
        );
        let server = TestServer::new(app).unwrap();

        let response = server
            .patch(&format!("/api/admin/covers/{}/status", uuid::Uuid::new_v4()))
            .json(&json!({ "status": "deleted" }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["code"], -1);
    }
}
