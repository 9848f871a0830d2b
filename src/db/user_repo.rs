// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::{
        auth::{UpdateUserPayload, User, UserRole},
        patch::patch_parts,
    },
};

/// Dados de inserção de um usuário (cadastro ou lead indicado).
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: Option<&'a str>,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
    pub role: UserRole,
    pub unit_id: Option<Uuid>,
    pub referral_code: &'a str,
    pub referred_by: Option<Uuid>,
    pub is_resolve_customer: bool,
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (comparação sem diferenciar maiúsculas)
    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID (usado pelo middleware de autenticação)
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_referral_code<'e, E>(
        &self,
        executor: E,
        code: &str,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE referral_code = upper($1)")
            .bind(code.trim())
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    pub async fn create_user<'e, E>(&self, executor: E, new: NewUser<'_>) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                email, password_hash, full_name, phone, role,
                unit_id, referral_code, referred_by, is_resolve_customer
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.full_name)
        .bind(new.phone)
        .bind(new.role)
        .bind(new.unit_id)
        .bind(new.referral_code)
        .bind(new.referred_by)
        .bind(new.is_resolve_customer)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    /// Completa o cadastro de um lead (usuário sem senha) criado por indicação.
    /// Devolve `None` se o usuário já tinha senha.
    pub async fn claim_lead<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
        full_name: &str,
        phone: Option<&str>,
        unit_id: Option<Uuid>,
        is_resolve_customer: bool,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2,
                full_name = $3,
                phone = COALESCE($4, phone),
                unit_id = COALESCE($5, unit_id),
                is_resolve_customer = $6,
                updated_at = NOW()
            WHERE id = $1 AND password_hash IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .bind(full_name)
        .bind(phone)
        .bind(unit_id)
        .bind(is_resolve_customer)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(executor)
            .await?;
        Ok(users)
    }

    pub async fn count<'e, E>(&self, executor: E) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        input: &UpdateUserPayload,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (phone_set, phone) = patch_parts(&input.phone);
        let (unit_set, unit_id) = patch_parts(&input.unit_id);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                phone = CASE WHEN $7 THEN $3 ELSE phone END,
                role = COALESCE($4, role),
                unit_id = CASE WHEN $8 THEN $5 ELSE unit_id END,
                is_resolve_customer = COALESCE($6, is_resolve_customer),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.full_name.as_deref())
        .bind(phone)
        .bind(input.role)
        .bind(unit_id)
        .bind(input.is_resolve_customer)
        .bind(phone_set)
        .bind(unit_set)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }

    // --- Contadores de indicação ---

    pub async fn increment_total_referrals<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE users SET total_referrals = total_referrals + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Soma `delta` ao contador de aprovadas, sem deixar ficar negativo.
    pub async fn adjust_approved_referrals<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        delta: i32,
    ) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (approved,): (i32,) = sqlx::query_as(
            r#"
            UPDATE users
            SET approved_referrals = GREATEST(approved_referrals + $2, 0),
                updated_at = NOW()
            WHERE id = $1
            RETURNING approved_referrals
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::UserNotFound)?;
        Ok(approved)
    }
}
