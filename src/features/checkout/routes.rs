use std::sync::Arc;

use axum::{routing::post, Router};

use crate::features::checkout::handlers;
use crate::features::checkout::services::CheckoutService;

/// Checkout routes
///
/// Requires the auth middleware to be applied by the caller
pub fn routes(service: Arc<CheckoutService>) -> Router {
    Router::new()
        .route("/api/checkout", post(handlers::create_checkout))
        .route("/api/checkout/confirm", post(handlers::confirm_checkout))
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::CreditsConfig;
    use crate::features::users::UserService;
    use crate::modules::payments::fake::FakeGateway;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_auth};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn app() -> Router {
        let pool = lazy_pool();
        let users = Arc::new(UserService::new(pool.clone(), CreditsConfig::default()));
        routes(Arc::new(CheckoutService::new(
            pool,
            users,
            Arc::new(FakeGateway::default()),
        )))
    }

    #[tokio::test]
    async fn test_checkout_requires_sign_in() {
        let server = TestServer::new(app()).unwrap();
        let response = server
            .post("/api/checkout")
            .json(&json!({ "plan": "pro" }))
            .await;
        response.assert_status_unauthorized();
        assert_eq!(response.json::<Value>()["code"], -2);
    }

    #[tokio::test]
    async fn test_checkout_validates_before_charging() {
        let server = TestServer::new(with_auth(app(), create_user("ada@example.com"))).unwrap();
        let response = server
            .post("/api/checkout")
            .json(&json!({ "plan": "Pro!" }))
            .await;
        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["code"], -1);
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unlisted_plan_is_rejected_whatever_the_price() {
        let server = TestServer::new(with_auth(app(), create_user("ada@example.com"))).unwrap();
        let response = server
            .post("/api/checkout")
            .json(&json!({ "plan": "mega", "amount": 50, "currency": "usd", "credits": 100000 }))
            .await;
        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["code"], -1);
        assert_eq!(body["message"], "Unknown plan: mega");
    }

    #[tokio::test]
    async fn test_confirm_rejects_blank_session() {
        let server = TestServer::new(with_auth(app(), create_user("ada@example.com"))).unwrap();
        let response = server
            .post("/api/checkout/confirm")
            .json(&json!({ "session_id": " " }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["code"], -1);
    }
}
