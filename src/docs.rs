// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_referral_link,

        // --- Units ---
        handlers::units::list_units,

        // --- Referrals ---
        handlers::referrals::create_referral,
        handlers::referrals::list_referrals,
        handlers::referrals::get_referral,
        handlers::referrals::status_options,
        handlers::referrals::update_status,
        handlers::referrals::export_referrals,

        // --- Dashboard ---
        handlers::dashboard::client_dashboard,

        // --- Settings ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Rewards ---
        handlers::rewards::my_rewards,

        // --- Admin ---
        handlers::dashboard::admin_analytics,
        handlers::users::list_users,
        handlers::users::update_user,
        handlers::users::list_activity,
        handlers::rewards::list_rewards,
        handlers::rewards::grant_reward,
        handlers::rewards::mark_reward_paid,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::ReferralLinkResponse,
            models::auth::UpdateUserPayload,

            // --- Referrals ---
            models::referral::ReferralStatus,
            models::referral::StatusOption,
            models::referral::Referral,
            models::referral::ReferralDetail,
            models::referral::CreateReferralPayload,
            models::referral::UpdateStatusPayload,
            models::referral::ExportFormat,

            // --- Dashboard ---
            models::dashboard::StatusCount,
            models::dashboard::UnitCount,
            models::dashboard::RankingEntry,
            models::dashboard::MonthlyEntry,
            models::dashboard::ClientDashboard,
            models::dashboard::AdminAnalytics,

            // --- Units / Settings / Rewards ---
            models::unit::Unit,
            models::settings::ProgramSettings,
            models::settings::UpdateSettingsRequest,
            models::reward::Reward,
            models::reward::GrantRewardPayload,
            models::activity::UserActivityLog,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Link de Indicação"),
        (name = "Units", description = "Unidades"),
        (name = "Referrals", description = "Indicações e Funil de Status"),
        (name = "Dashboard", description = "Painel do Cliente"),
        (name = "Settings", description = "Configurações do Programa"),
        (name = "Rewards", description = "Recompensas"),
        (name = "Admin", description = "Painel Administrativo")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
