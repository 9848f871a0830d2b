// src/services/user_service.rs

use qrcode::{render::svg, QrCode};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, SettingsRepository, UnitRepository, UserRepository},
    models::{
        activity::{ActivityQuery, UserActivityLog, ACTION_USER_UPDATED},
        auth::{ReferralLinkResponse, UpdateUserPayload, User, UserFilter, UserRole},
        pagination::{Page, PageRequest},
    },
};

/// Link de cadastro com o código de quem indica.
pub fn build_referral_link(base_url: &str, code: &str) -> String {
    format!("{}/cadastro?ref={}", base_url.trim_end_matches('/'), code)
}

/// Somente Super admin mexe em Super admin (promover, rebaixar ou editar).
pub fn ensure_can_edit(
    actor: UserRole,
    target: UserRole,
    new_role: Option<UserRole>,
) -> Result<(), AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden);
    }
    let touches_super_admin =
        target == UserRole::SuperAdmin || new_role == Some(UserRole::SuperAdmin);
    if touches_super_admin && actor != UserRole::SuperAdmin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    unit_repo: UnitRepository,
    settings_repo: SettingsRepository,
    activity_repo: ActivityRepository,
    app_base_url: String,
    pool: PgPool,
}

impl UserService {
    pub fn new(
        user_repo: UserRepository,
        unit_repo: UnitRepository,
        settings_repo: SettingsRepository,
        activity_repo: ActivityRepository,
        app_base_url: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, unit_repo, settings_repo, activity_repo, app_base_url, pool }
    }

    /// Link de indicação; a URL das configurações tem prioridade sobre APP_BASE_URL.
    pub async fn referral_link_for(&self, code: &str) -> Result<String, AppError> {
        let settings = self.settings_repo.get_settings().await?;
        let base = settings
            .referral_base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.app_base_url.clone());
        Ok(build_referral_link(&base, code))
    }

    pub async fn referral_link(&self, user: &User) -> Result<ReferralLinkResponse, AppError> {
        let link = self.referral_link_for(&user.referral_code).await?;

        let qr = QrCode::new(link.as_bytes())
            .map_err(|e| anyhow::anyhow!("Falha ao gerar QR Code: {}", e))?;
        let qr_svg = qr
            .render::<svg::Color>()
            .min_dimensions(200, 200)
            .build();

        Ok(ReferralLinkResponse {
            code: user.referral_code.clone(),
            link,
            qr_svg,
        })
    }

    pub async fn list_users(&self, filter: &UserFilter) -> Result<Page<User>, AppError> {
        let users = self.user_repo.list_all(&self.pool).await?;
        let filtered = users.into_iter().filter(|u| filter.matches(u)).collect();
        Ok(Page::paginate(filtered, filter.page, filter.per_page))
    }

    pub async fn update_user(
        &self,
        actor: &User,
        user_id: Uuid,
        input: &UpdateUserPayload,
    ) -> Result<User, AppError> {
        let target = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        ensure_can_edit(actor.role, target.role, input.role)?;

        if let Some(Some(unit_id)) = input.unit_id {
            if !self.unit_repo.exists(unit_id).await? {
                return Err(AppError::UnitNotFound);
            }
        }

        let mut tx = self.pool.begin().await?;
        let updated = self
            .user_repo
            .update_user(&mut *tx, user_id, input)
            .await?
            .ok_or(AppError::UserNotFound)?;

        self.activity_repo
            .log(
                &mut *tx,
                actor.id,
                ACTION_USER_UPDATED,
                json!({
                    "userId": user_id,
                    "roleFrom": target.role,
                    "roleTo": updated.role,
                }),
            )
            .await?;
        tx.commit().await?;

        if target.role != updated.role {
            tracing::info!("🔑 {} mudou o cargo de {}: {} -> {}", actor.id, user_id, target.role, updated.role);
        }

        Ok(updated)
    }

    pub async fn activity(&self, query: &ActivityQuery) -> Result<Page<UserActivityLog>, AppError> {
        let request = PageRequest::new(query.page, query.per_page);
        let total = self.activity_repo.count(query.user_id).await?;
        let logs = self
            .activity_repo
            .list_page(query.user_id, request.limit() as i64, request.offset() as i64)
            .await?;
        Ok(Page::from_parts(logs, total.max(0) as usize, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_joins_base_and_code() {
        assert_eq!(
            build_referral_link("https://indica.exemplo.com/", "A1B2C3D4"),
            "https://indica.exemplo.com/cadastro?ref=A1B2C3D4"
        );
        assert_eq!(
            build_referral_link("http://localhost:5173", "X"),
            "http://localhost:5173/cadastro?ref=X"
        );
    }

    #[test]
    fn only_admins_edit_users() {
        for role in [UserRole::Cliente, UserRole::Vendedor, UserRole::Sdr, UserRole::Contratos] {
            assert!(matches!(
                ensure_can_edit(role, UserRole::Cliente, None),
                Err(AppError::Forbidden)
            ));
        }
        assert!(ensure_can_edit(UserRole::Admin, UserRole::Cliente, Some(UserRole::Sdr)).is_ok());
    }

    #[test]
    fn super_admin_is_guarded_by_super_admin() {
        assert!(ensure_can_edit(UserRole::Admin, UserRole::SuperAdmin, None).is_err());
        assert!(ensure_can_edit(UserRole::Admin, UserRole::Admin, Some(UserRole::SuperAdmin)).is_err());
        assert!(ensure_can_edit(UserRole::SuperAdmin, UserRole::SuperAdmin, Some(UserRole::Admin)).is_ok());
        assert!(ensure_can_edit(UserRole::SuperAdmin, UserRole::Cliente, Some(UserRole::SuperAdmin)).is_ok());
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::db::fixtures::{insert_user, state};

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn activity_pages_past_the_first_thousand_rows(pool: PgPool) {
        let app = state(&pool);
        let admin = insert_user(&pool, "admin@exemplo.com", UserRole::Admin).await;

        sqlx::query(
            r#"
            INSERT INTO user_activity_logs (user_id, action, created_at)
            SELECT $1, 'user_updated', NOW() - make_interval(secs => n)
            FROM generate_series(1, 1500) AS n
            "#,
        )
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap();

        let query = ActivityQuery { user_id: Some(admin.id), page: Some(120), per_page: Some(10) };
        let page = app.user_service.activity(&query).await.unwrap();
        assert_eq!(page.total, 1500);
        assert_eq!(page.total_pages, 150);
        assert_eq!(page.items.len(), 10);

        let last = ActivityQuery { user_id: Some(admin.id), page: Some(150), per_page: Some(10) };
        let page = app.user_service.activity(&last).await.unwrap();
        assert_eq!(page.items.len(), 10);
        assert!(page.items.iter().all(|log| log.user_id == admin.id));
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn null_clears_phone_and_unit(pool: PgPool) {
        let app = state(&pool);
        let admin = insert_user(&pool, "admin@exemplo.com", UserRole::Admin).await;
        let client = insert_user(&pool, "cli@exemplo.com", UserRole::Cliente).await;
        let (unit_id,): (Uuid,) =
            sqlx::query_as("INSERT INTO units (name) VALUES ('Centro') RETURNING id")
                .fetch_one(&pool)
                .await
                .unwrap();

        let set: UpdateUserPayload = serde_json::from_value(serde_json::json!({
            "phone": "(11) 91234-5678",
            "unitId": unit_id,
        }))
        .unwrap();
        let user = app.user_service.update_user(&admin, client.id, &set).await.unwrap();
        assert_eq!(user.phone.as_deref(), Some("(11) 91234-5678"));
        assert_eq!(user.unit_id, Some(unit_id));

        // Campo ausente não mexe no valor
        let untouched: UpdateUserPayload =
            serde_json::from_value(serde_json::json!({ "fullName": "Cliente Novo" })).unwrap();
        let user = app.user_service.update_user(&admin, client.id, &untouched).await.unwrap();
        assert_eq!(user.phone.as_deref(), Some("(11) 91234-5678"));
        assert_eq!(user.unit_id, Some(unit_id));

        let cleared: UpdateUserPayload =
            serde_json::from_value(serde_json::json!({ "phone": null, "unitId": null })).unwrap();
        let user = app.user_service.update_user(&admin, client.id, &cleared).await.unwrap();
        assert_eq!(user.phone, None);
        assert_eq!(user.unit_id, None);
        assert_eq!(user.full_name, "Cliente Novo");
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL and a local Postgres"]
    async fn cleared_base_url_falls_back_to_app_url(pool: PgPool) {
        let app = state(&pool);
        let settings: crate::models::settings::UpdateSettingsRequest =
            serde_json::from_value(serde_json::json!({ "referralBaseUrl": "https://indica.exemplo.com" }))
                .unwrap();
        app.settings_repo.update_settings(&pool, &settings).await.unwrap();
        assert_eq!(
            app.user_service.referral_link_for("ABC").await.unwrap(),
            "https://indica.exemplo.com/cadastro?ref=ABC"
        );

        let cleared: crate::models::settings::UpdateSettingsRequest =
            serde_json::from_value(serde_json::json!({ "referralBaseUrl": null })).unwrap();
        let saved = app.settings_repo.update_settings(&pool, &cleared).await.unwrap();
        assert_eq!(saved.referral_base_url, None);
        assert_eq!(
            app.user_service.referral_link_for("ABC").await.unwrap(),
            "http://localhost:5173/cadastro?ref=ABC"
        );
    }
}
