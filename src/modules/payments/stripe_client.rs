use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{CheckoutRequest, CheckoutSession, PaymentGateway, SessionStatus};
use crate::core::config::PaymentConfig;
use crate::core::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Deserialize)]
struct StripeSession {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    #[serde(default)]
    message: Option<String>,
}

/// Stripe Checkout over the REST API (form-encoded requests)
pub struct StripeClient {
    client: Client,
    config: PaymentConfig,
}

impl StripeClient {
    pub fn new(config: PaymentConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn session_form(&self, request: &CheckoutRequest) -> Vec<(&'static str, String)> {
        vec![
            ("mode", "payment".to_string()),
            ("success_url", self.config.success_url.clone()),
            ("cancel_url", self.config.cancel_url.clone()),
            ("client_reference_id", request.order_no.clone()),
            ("customer_email", request.customer_email.clone()),
            ("line_items[0][quantity]", "1".to_string()),
            ("line_items[0][price_data][currency]", request.currency.clone()),
            ("line_items[0][price_data][unit_amount]", request.amount.to_string()),
            (
                "line_items[0][price_data][product_data][name]",
                format!("{} plan ({} credits)", request.plan, request.credits),
            ),
            ("metadata[order_no]", request.order_no.clone()),
            ("metadata[credits]", request.credits.to_string()),
        ]
    }

    async fn parse(response: reqwest::Response) -> Result<StripeSession> {
        let status = response.status();
        if status.is_success() {
            return response.json::<StripeSession>().await.map_err(|e| {
                tracing::error!("Failed to parse Stripe session: {:?}", e);
                AppError::ExternalServiceError("Invalid response from payment provider".to_string())
            });
        }

        let message = response
            .json::<StripeErrorBody>()
            .await
            .ok()
            .and_then(|b| b.error.message)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        tracing::error!("Stripe returned {}: {}", status, message);

        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound("No such checkout session".to_string()));
        }
        Err(AppError::ExternalServiceError(format!(
            "Payment provider error: {}",
            message
        )))
    }
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_checkout(&self, request: &CheckoutRequest) -> Result<CheckoutSession> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.config.api_base_url))
            .bearer_auth(&self.config.secret_key)
            .header("Idempotency-Key", &request.order_no)
            .form(&self.session_form(request))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Stripe request failed: {:?}", e);
                AppError::ExternalServiceError("Payment provider is unreachable".to_string())
            })?;

        let session = Self::parse(response).await?;
        let url = session.url.ok_or_else(|| {
            AppError::ExternalServiceError("Checkout session has no URL".to_string())
        })?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        let response = self
            .client
            .get(format!(
                "{}/checkout/sessions/{}",
                self.config.api_base_url,
                urlencoding::encode(session_id)
            ))
            .bearer_auth(&self.config.secret_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Stripe request failed: {:?}", e);
                AppError::ExternalServiceError("Payment provider is unreachable".to_string())
            })?;

        let session = Self::parse(response).await?;
        Ok(SessionStatus {
            paid: session.payment_status.as_deref() == Some("paid"),
            order_no: session.client_reference_id,
            id: session.id,
        })
    }
}
