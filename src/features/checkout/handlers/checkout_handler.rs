use std::sync::Arc;

use axum::{extract::State, Json};
use validator::Validate;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::checkout::dtos::{
    CheckoutSessionDto, ConfirmCheckoutDto, ConfirmationDto, CreateCheckoutDto,
};
use crate::features::checkout::services::CheckoutService;
use crate::shared::types::ApiResponse;

/// Start a credit purchase
#[utoipa::path(
    post,
    path = "/api/checkout",
    request_body = CreateCheckoutDto,
    responses(
        (status = 200, description = "Checkout session created", body = ApiResponse<CheckoutSessionDto>),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Sign in required"),
        (status = 502, description = "Payment provider failed")
    ),
    security(("bearer_auth" = [])),
    tag = "checkout"
)]
pub async fn create_checkout(
    user: AuthenticatedUser,
    State(service): State<Arc<CheckoutService>>,
    AppJson(dto): AppJson<CreateCheckoutDto>,
) -> Result<Json<ApiResponse<CheckoutSessionDto>>> {
    dto.validate()?;
    let session = service.create_checkout(&user, dto).await?;
    Ok(Json(ApiResponse::success(Some(session), None, None)))
}

/// Confirm a checkout session after the payment redirect
///
/// Safe to call repeatedly; credits are granted once.
#[utoipa::path(
    post,
    path = "/api/checkout/confirm",
    request_body = ConfirmCheckoutDto,
    responses(
        (status = 200, description = "Order state after settling", body = ApiResponse<ConfirmationDto>),
        (status = 401, description = "Sign in required"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer_auth" = [])),
    tag = "checkout"
)]
pub async fn confirm_checkout(
    user: AuthenticatedUser,
    State(service): State<Arc<CheckoutService>>,
    AppJson(dto): AppJson<ConfirmCheckoutDto>,
) -> Result<Json<ApiResponse<ConfirmationDto>>> {
    dto.validate()?;
    let confirmation = service.confirm(&user, &dto.session_id).await?;
    Ok(Json(ApiResponse::success(Some(confirmation), None, None)))
}
