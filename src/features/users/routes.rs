use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::covers::CoverService;
use crate::features::users::handlers::{self, UserState};
use crate::features::users::services::UserService;

/// User routes
///
/// Requires the auth middleware to be applied by the caller
pub fn routes(users: Arc<UserService>, covers: Arc<CoverService>) -> Router {
    Router::new()
        .route("/api/users/me", get(handlers::get_me).patch(handlers::update_me))
        .with_state(UserState { users, covers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CreditsConfig;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_auth};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn app() -> Router {
        let pool = lazy_pool();
        routes(
            Arc::new(UserService::new(pool.clone(), CreditsConfig::default())),
            Arc::new(CoverService::new(pool)),
        )
    }

    #[tokio::test]
    async fn test_me_requires_sign_in() {
        let server = TestServer::new(app()).unwrap();
        let response = server.get("/api/users/me").await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["code"], -2);
    }

    #[tokio::test]
    async fn test_update_rejects_bad_avatar() {
        let server = TestServer::new(with_auth(app(), create_user("ada@example.com"))).unwrap();
        let response = server
            .patch("/api/users/me")
            .json(&json!({ "avatar_url": "not a url" }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["code"], -1);
    }
}
