//! Payment processor used for credit purchases.

mod stripe_client;

use async_trait::async_trait;

use crate::core::error::AppError;

pub use stripe_client::StripeClient;

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub order_no: String,
    pub plan: String,
    /// Amount in the currency's minor unit (cents)
    pub amount: i64,
    pub currency: String,
    pub credits: i32,
    pub customer_email: String,
}

#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// State of a checkout session as reported by the processor
#[derive(Debug, Clone)]
pub struct SessionStatus {
    pub id: String,
    pub paid: bool,
    /// Order number the session was created for
    pub order_no: Option<String>,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_checkout(&self, request: &CheckoutRequest)
        -> Result<CheckoutSession, AppError>;

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus, AppError>;
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Gateway that records sessions and reports the ones in `paid` as paid
    #[derive(Default)]
    pub struct FakeGateway {
        pub created: Mutex<Vec<CheckoutRequest>>,
        pub sessions: Mutex<HashMap<String, String>>,
        pub paid: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PaymentGateway for FakeGateway {
        async fn create_checkout(
            &self,
            request: &CheckoutRequest,
        ) -> Result<CheckoutSession, AppError> {
            self.created.lock().unwrap().push(request.clone());
            let id = format!("cs_test_{}", request.order_no);
            self.sessions
                .lock()
                .unwrap()
                .insert(id.clone(), request.order_no.clone());
            Ok(CheckoutSession {
                url: format!("https://checkout.test/{}", id),
                id,
            })
        }

        async fn session_status(&self, session_id: &str) -> Result<SessionStatus, AppError> {
            let order_no = self.sessions.lock().unwrap().get(session_id).cloned();
            if order_no.is_none() {
                return Err(AppError::NotFound("No such checkout session".into()));
            }
            Ok(SessionStatus {
                id: session_id.to_string(),
                paid: self.paid.lock().unwrap().iter().any(|s| s == session_id),
                order_no,
            })
        }
    }
}
