use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::checkout::dtos::{CheckoutSessionDto, ConfirmationDto, CreateCheckoutDto};
use crate::features::checkout::models::{Order, OrderStatus, Plan};
use crate::features::users::UserService;
use crate::modules::payments::{CheckoutRequest, PaymentGateway};

const ORDER_COLUMNS: &str = "order_no, user_email, plan, amount, currency, credits, status, \
                             stripe_session_id, created_at, paid_at";

pub struct CheckoutService {
    pool: PgPool,
    users: Arc<UserService>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(pool: PgPool, users: Arc<UserService>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            pool,
            users,
            gateway,
        }
    }

    pub async fn find_order(&self, order_no: &str) -> Result<Option<Order>> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE order_no = $1",
            ORDER_COLUMNS
        ))
        .bind(order_no)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get order {}: {:?}", order_no, e);
            AppError::Database(e)
        })
    }

    /// Record an order for a catalogue plan and open a checkout session for it
    pub async fn create_checkout(
        &self,
        user: &AuthenticatedUser,
        dto: CreateCheckoutDto,
    ) -> Result<CheckoutSessionDto> {
        let plan = Plan::find(&dto.plan)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown plan: {}", dto.plan)))?;

        self.users.ensure_user(user).await?;
        let order_no = Uuid::now_v7().to_string();

        sqlx::query(
            r#"
            INSERT INTO orders (order_no, user_email, plan, amount, currency, credits, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&order_no)
        .bind(&user.email)
        .bind(plan.id)
        .bind(plan.amount)
        .bind(plan.currency)
        .bind(plan.credits)
        .bind(OrderStatus::Created)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create order for {}: {:?}", user.email, e);
            AppError::Database(e)
        })?;

        let session = self
            .gateway
            .create_checkout(&CheckoutRequest {
                order_no: order_no.clone(),
                plan: plan.id.to_string(),
                amount: plan.amount,
                currency: plan.currency.to_string(),
                credits: plan.credits,
                customer_email: user.email.clone(),
            })
            .await?;

        sqlx::query("UPDATE orders SET stripe_session_id = $2 WHERE order_no = $1")
            .bind(&order_no)
            .bind(&session.id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to attach session to order {}: {:?}", order_no, e);
                AppError::Database(e)
            })?;

        tracing::info!("Order {} opened checkout session {}", order_no, session.id);
        Ok(CheckoutSessionDto {
            order_no,
            session_id: session.id,
            url: session.url,
        })
    }

    /// Settle a checkout session. Paying an order and granting its credits
    /// happen in one transaction, and only while the order is still open, so
    /// repeated confirmations grant nothing.
    pub async fn confirm(
        &self,
        user: &AuthenticatedUser,
        session_id: &str,
    ) -> Result<ConfirmationDto> {
        let session_id = session_id.trim();
        let status = self.gateway.session_status(session_id).await?;

        let order = match status.order_no.as_deref() {
            Some(order_no) => self.find_order(order_no).await?,
            None => None,
        }
        .filter(|o| o.user_email == user.email)
        .ok_or_else(|| AppError::NotFound("No order for this checkout session".to_string()))?;

        if !status.paid {
            let balance = self.users.get_by_email(&user.email).await?.credits;
            return Ok(ConfirmationDto {
                order_no: order.order_no,
                status: order.status,
                credits_granted: 0,
                credits: balance,
            });
        }

        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let settled = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE orders
            SET status = 'paid', paid_at = NOW(), stripe_session_id = COALESCE(stripe_session_id, $2)
            WHERE order_no = $1 AND status = 'created'
            RETURNING credits
            "#,
        )
        .bind(&order.order_no)
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark order {} paid: {:?}", order.order_no, e);
            AppError::Database(e)
        })?;

        let credits_granted = match settled {
            Some(credits) => {
                UserService::grant_credits(&mut *tx, &user.email, credits).await?;
                credits
            }
            None => 0,
        };

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit order {}: {:?}", order.order_no, e);
            AppError::Database(e)
        })?;

        if credits_granted > 0 {
            tracing::info!(
                "Order {} paid, granted {} credits to {}",
                order.order_no,
                credits_granted,
                user.email
            );
        }

        let balance = self.users.get_by_email(&user.email).await?.credits;
        Ok(ConfirmationDto {
            order_no: order.order_no,
            status: OrderStatus::Paid,
            credits_granted,
            credits: balance,
        })
    }
}
