use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::core::config::CreditsConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UpdateProfileDto;
use crate::features::users::models::User;

const USER_COLUMNS: &str = "email, uuid, nickname, avatar_url, credits, created_at, updated_at";

/// Users and credit accounting
pub struct UserService {
    pool: PgPool,
    credits: CreditsConfig,
}

impl UserService {
    pub fn new(pool: PgPool, credits: CreditsConfig) -> Self {
        Self { pool, credits }
    }

    /// Credits one generation costs
    pub fn credits_per_generation(&self) -> i32 {
        self.credits.per_generation
    }

    /// Return the user row for `identity`, creating it with the starting
    /// credit grant on first sight.
    pub async fn ensure_user(&self, identity: &AuthenticatedUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, uuid, nickname, avatar_url, credits)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE
                SET avatar_url = COALESCE(users.avatar_url, EXCLUDED.avatar_url)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&identity.email)
        .bind(Uuid::now_v7())
        .bind(identity.nickname())
        .bind(&identity.picture)
        .bind(self.credits.initial_credits)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user {}: {:?}", identity.email, e);
            AppError::Database(e)
        })?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user {}: {:?}", email, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }

    pub async fn update_profile(&self, email: &str, dto: UpdateProfileDto) -> Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET nickname = COALESCE($2, nickname),
                avatar_url = COALESCE($3, avatar_url),
                updated_at = NOW()
            WHERE email = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(email)
        .bind(dto.nickname.as_deref().map(str::trim))
        .bind(&dto.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update user {}: {:?}", email, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }

    /// Take `amount` credits in a single conditional update and return the
    /// remaining balance. Fails without touching the row when the balance is
    /// too low.
    pub async fn consume_credits(&self, email: &str, amount: i32) -> Result<i32> {
        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET credits = credits - $2, updated_at = NOW()
            WHERE email = $1 AND credits >= $2
            RETURNING credits
            "#,
        )
        .bind(email)
        .bind(amount)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to consume credits for {}: {:?}", email, e);
            AppError::Database(e)
        })?;

        match remaining {
            Some(left) => {
                tracing::info!("Consumed {} credits from {}, {} left", amount, email, left);
                Ok(left)
            }
            None => Err(AppError::InsufficientCredits(format!(
                "{} credits required",
                amount
            ))),
        }
    }

    /// Give back credits taken for work that did not complete
    pub async fn refund_credits(&self, email: &str, amount: i32) -> Result<i32> {
        let balance = Self::grant_credits(&self.pool, email, amount).await?;
        tracing::info!("Refunded {} credits to {}", amount, email);
        Ok(balance)
    }

    /// Add credits and return the new balance. Takes any executor so that
    /// it can run inside a caller's transaction.
    pub async fn grant_credits<'e, E>(executor: E, email: &str, amount: i32) -> Result<i32>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users
            SET credits = credits + $2, updated_at = NOW()
            WHERE email = $1
            RETURNING credits
            "#,
        )
        .bind(email)
        .bind(amount)
        .fetch_optional(executor)
        .await
        .map_err(|e| {
            tracing::error!("Failed to grant credits to {}: {:?}", email, e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", email)))
    }
}
