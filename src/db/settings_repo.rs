use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::{
        patch::patch_parts,
        settings::{ProgramSettings, UpdateSettingsRequest},
    },
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_settings(&self) -> Result<ProgramSettings, AppError> {
        let settings = sqlx::query_as::<_, ProgramSettings>(
            "SELECT program_name, referral_base_url, reward_per_approval, updated_at FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        // Sem a linha, devolve os padrões da tabela
        match settings {
            Some(s) => Ok(s),
            None => Ok(ProgramSettings {
                program_name: "Programa de Indicações".to_string(),
                referral_base_url: None,
                reward_per_approval: Decimal::ZERO,
                updated_at: Utc::now(),
            }),
        }
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        input: &UpdateSettingsRequest,
    ) -> Result<ProgramSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (base_url_set, base_url) = patch_parts(&input.referral_base_url);

        // UPSERT (Insert or Update)
        let settings = sqlx::query_as::<_, ProgramSettings>(
            r#"
            INSERT INTO settings (id, program_name, referral_base_url, reward_per_approval)
            VALUES (1, COALESCE($1, 'Programa de Indicações'), $2, COALESCE($3, 0))
            ON CONFLICT (id)
            DO UPDATE SET
                program_name = COALESCE($1, settings.program_name),
                referral_base_url = CASE WHEN $4 THEN $2 ELSE settings.referral_base_url END,
                reward_per_approval = COALESCE($3, settings.reward_per_approval),
                updated_at = NOW()
            RETURNING program_name, referral_base_url, reward_per_approval, updated_at
            "#,
        )
        .bind(input.program_name.as_deref())
        .bind(base_url)
        .bind(input.reward_per_approval)
        .bind(base_url_set)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }
}
