use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::features::pdfs::handlers;
use crate::features::pdfs::services::PdfService;
use crate::shared::constants::MAX_PDF_SIZE;

/// Room for the multipart envelope and text fields around the file
const FORM_OVERHEAD: usize = 64 * 1024;

/// Public pdf routes
pub fn routes(service: Arc<PdfService>) -> Router {
    Router::new()
        .route("/api/pdfs", get(handlers::get_pdf))
        .with_state(service)
}

/// Upload route
///
/// Requires the auth middleware to be applied by the caller
pub fn protected_routes(service: Arc<PdfService>) -> Router {
    Router::new()
        .route(
            "/api/pdfs",
            post(handlers::upload_pdf).layer(DefaultBodyLimit::max(MAX_PDF_SIZE + FORM_OVERHEAD)),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::covers::CoverService;
    use crate::modules::storage::fake::FakeStorage;
    use crate::shared::test_helpers::{create_user, lazy_pool, with_auth};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::Value;

    fn server() -> TestServer {
        let pool = lazy_pool();
        let service = Arc::new(PdfService::new(
            pool.clone(),
            Arc::new(CoverService::new(pool)),
            Arc::new(FakeStorage::default()),
        ));
        let app = with_auth(protected_routes(service), create_user("ada@example.com"));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn test_upload_rejects_non_pdf() {
        let form = MultipartForm::new()
            .add_text("cover_uuid", uuid::Uuid::new_v4().to_string())
            .add_part(
                "pdf",
                Part::bytes(b"hello".to_vec())
                    .file_name("notes.txt")
                    .mime_type("text/plain"),
            );

        let response = server().post("/api/pdfs").multipart(form).await;

        response.assert_status_bad_request();
        let body = response.json::<Value>();
        assert_eq!(body["code"], -1);
        assert!(body["message"].as_str().unwrap().contains("not allowed"));
    }

    #[tokio::test]
    async fn test_upload_requires_cover_uuid() {
        let form = MultipartForm::new().add_part(
            "pdf",
            Part::bytes(b"%PDF-1.7".to_vec())
                .file_name("cover.pdf")
                .mime_type("application/pdf"),
        );

        let response = server().post("/api/pdfs").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["message"], "cover_uuid is required");
    }

    #[tokio::test]
    async fn test_upload_rejects_malformed_uuid() {
        let form = MultipartForm::new().add_text("cover_uuid", "cover-1");

        let response = server().post("/api/pdfs").multipart(form).await;

        response.assert_status_bad_request();
        assert_eq!(
            response.json::<Value>()["message"],
            "cover_uuid must be a valid UUID"
        );
    }
}
