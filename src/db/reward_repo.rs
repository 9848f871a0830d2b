// src/db/reward_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::reward::Reward};

#[derive(Clone)]
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        referral_id: Option<Uuid>,
        amount: Decimal,
        description: Option<&str>,
    ) -> Result<Reward, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            INSERT INTO rewards (user_id, referral_id, amount, description)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(referral_id)
        .bind(amount)
        .bind(description)
        .fetch_one(executor)
        .await?;
        Ok(reward)
    }

    /// Com `user_id`, só as recompensas desse usuário.
    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<Reward>, AppError> {
        let rewards = sqlx::query_as::<_, Reward>(
            "SELECT * FROM rewards WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rewards)
    }

    // Marcar como pago é idempotente: mantém a data do primeiro pagamento
    pub async fn mark_paid(&self, id: Uuid) -> Result<Reward, AppError> {
        sqlx::query_as::<_, Reward>(
            "UPDATE rewards SET paid_at = COALESCE(paid_at, NOW()) WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::RewardNotFound)
    }
}
