// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        ActivityRepository, ReferralRepository, RewardRepository, SettingsRepository,
        UnitRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        dashboard_service::DashboardService,
        notification_service::{HttpPushNotifier, LogOnlyNotifier, NotificationService, PushNotifier},
        referral_service::ReferralService,
        reward_service::RewardService,
        user_service::UserService,
    },
};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_APP_BASE_URL: &str = "http://localhost:5173";

#[derive(Debug, Clone, PartialEq)]
pub struct PushConfig {
    pub url: String,
    pub app_id: String,
    pub api_key: Option<String>,
}

/// Configuração lida das variáveis de ambiente.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub app_base_url: String,
    /// `None` desliga o envio de push
    pub push: Option<PushConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Vazio conta como ausente
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = get("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let push = match (get("PUSH_API_URL"), get("PUSH_APP_ID")) {
            (Some(url), Some(app_id)) => Some(PushConfig {
                url,
                app_id,
                api_key: get("PUSH_API_KEY"),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            server_addr: get("SERVER_ADDR").unwrap_or_else(|| DEFAULT_SERVER_ADDR.to_string()),
            app_base_url: get("APP_BASE_URL").unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string()),
            push,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,

    pub auth_service: AuthService,
    pub user_service: UserService,
    pub referral_service: ReferralService,
    pub dashboard_service: DashboardService,
    pub reward_service: RewardService,

    pub unit_repo: UnitRepository,
    pub settings_repo: SettingsRepository,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::build(db_pool, config))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(db_pool: PgPool, config: &AppConfig) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let referral_repo = ReferralRepository::new(db_pool.clone());
        let unit_repo = UnitRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());
        let reward_repo = RewardRepository::new(db_pool.clone());

        let notifier: Arc<dyn PushNotifier> = match &config.push {
            Some(push) => {
                tracing::info!("🔔 Push habilitado ({})", push.url);
                Arc::new(HttpPushNotifier::new(push.url.clone(), push.app_id.clone(), push.api_key.clone()))
            }
            None => {
                tracing::warn!("🔕 PUSH_API_URL/PUSH_APP_ID ausentes: notificações desativadas");
                Arc::new(LogOnlyNotifier)
            }
        };
        let notifications = NotificationService::new(notifier);

        let auth_service = AuthService::new(
            user_repo.clone(),
            referral_repo.clone(),
            unit_repo.clone(),
            activity_repo.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
        );
        let user_service = UserService::new(
            user_repo.clone(),
            unit_repo.clone(),
            settings_repo.clone(),
            activity_repo.clone(),
            config.app_base_url.clone(),
            db_pool.clone(),
        );
        let referral_service = ReferralService::new(
            referral_repo.clone(),
            user_repo.clone(),
            unit_repo.clone(),
            activity_repo.clone(),
            notifications,
        );
        let dashboard_service = DashboardService::new(
            referral_repo.clone(),
            user_repo.clone(),
            user_service.clone(),
            db_pool.clone(),
        );
        let reward_service = RewardService::new(
            reward_repo,
            user_repo,
            referral_repo,
            settings_repo.clone(),
            activity_repo,
            db_pool.clone(),
        );

        Self {
            db_pool,
            i18n_store: Arc::new(I18nStore::new()),
            auth_service,
            user_service,
            referral_service,
            dashboard_service,
            reward_service,
            unit_repo,
            settings_repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn required_variables_are_enforced() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));

        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", " ")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn defaults_apply_and_push_needs_url_and_app_id() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PUSH_API_URL", "https://push.exemplo.com/notifications"),
        ]))
        .unwrap();
        assert_eq!(config.server_addr, DEFAULT_SERVER_ADDR);
        assert_eq!(config.app_base_url, DEFAULT_APP_BASE_URL);
        assert!(config.push.is_none());
    }

    #[test]
    fn push_is_enabled_with_url_and_app_id() {
        let config = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "s"),
            ("PUSH_API_URL", "https://push.exemplo.com/notifications"),
            ("PUSH_APP_ID", "app-1"),
            ("PUSH_API_KEY", "chave"),
        ]))
        .unwrap();
        assert_eq!(
            config.push,
            Some(PushConfig {
                url: "https://push.exemplo.com/notifications".to_string(),
                app_id: "app-1".to_string(),
                api_key: Some("chave".to_string()),
            })
        );
    }
}
