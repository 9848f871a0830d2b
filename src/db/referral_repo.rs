// src/db/referral_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::referral::{Referral, ReferralDetail, ReferralStatus},
};

// Indicação + indicador + indicado + unidade numa linha só
const DETAIL_SELECT: &str = r#"
    SELECT
        r.id, r.status, r.rejection_reason, r.unit_id,
        un.name AS unit_name,
        r.referrer_id,
        referrer.full_name AS referrer_name,
        referrer.email AS referrer_email,
        referrer.phone AS referrer_phone,
        r.referred_id,
        referred.full_name AS referred_name,
        referred.email AS referred_email,
        referred.phone AS referred_phone,
        r.created_at, r.updated_at
    FROM referrals r
    JOIN users referrer ON referrer.id = r.referrer_id
    JOIN users referred ON referred.id = r.referred_id
    LEFT JOIN units un ON un.id = r.unit_id
"#;

#[derive(Clone)]
pub struct ReferralRepository {
    pool: PgPool,
}

impl ReferralRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Cria a indicação no estágio inicial.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        referrer_id: Uuid,
        referred_id: Uuid,
        unit_id: Option<Uuid>,
    ) -> Result<Referral, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Referral>(
            r#"
            INSERT INTO referrals (referrer_id, referred_id, status, unit_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(referrer_id)
        .bind(referred_id)
        .bind(ReferralStatus::Indicacao)
        .bind(unit_id)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn exists_for_referred<'e, E>(&self, executor: E, referred_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM referrals WHERE referred_id = $1)")
                .bind(referred_id)
                .fetch_one(executor)
                .await?;
        Ok(exists)
    }

    /// Busca e trava a linha até o fim da transação.
    pub async fn find_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Referral>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let referral = sqlx::query_as::<_, Referral>("SELECT * FROM referrals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(referral)
    }

    pub async fn update_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: ReferralStatus,
        rejection_reason: Option<&str>,
    ) -> Result<Referral, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let referral = sqlx::query_as::<_, Referral>(
            r#"
            UPDATE referrals
            SET status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(rejection_reason)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ReferralNotFound)?;
        Ok(referral)
    }

    pub async fn find_detail<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ReferralDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("{DETAIL_SELECT} WHERE r.id = $1");
        let detail = sqlx::query_as::<_, ReferralDetail>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(detail)
    }

    /// Lista as indicações, mais recentes primeiro.
    /// Com `referrer_id`, só as feitas por esse usuário.
    pub async fn list_details<'e, E>(
        &self,
        executor: E,
        referrer_id: Option<Uuid>,
    ) -> Result<Vec<ReferralDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "{DETAIL_SELECT} WHERE ($1::uuid IS NULL OR r.referrer_id = $1) ORDER BY r.created_at DESC"
        );
        let details = sqlx::query_as::<_, ReferralDetail>(&sql)
            .bind(referrer_id)
            .fetch_all(executor)
            .await?;
        Ok(details)
    }
}
