//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuração primeiro: o .env pode trazer o RUST_LOG
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    // Se o estado falhar, a aplicação não deve iniciar
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas protegidas (Bearer token)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/referral-link", get(handlers::auth::get_referral_link));

    let referral_routes = Router::new()
        .route(
            "/",
            post(handlers::referrals::create_referral).get(handlers::referrals::list_referrals),
        )
        .route("/export", get(handlers::referrals::export_referrals))
        .route("/{id}", get(handlers::referrals::get_referral))
        .route("/{id}/status-options", get(handlers::referrals::status_options))
        .route("/{id}/status", put(handlers::referrals::update_status));

    // Admin: o cargo é checado no handler (RequireRole<AdminOnly>)
    let admin_routes = Router::new()
        .route("/analytics", get(handlers::dashboard::admin_analytics))
        .route("/users", get(handlers::users::list_users))
        .route("/users/{id}", put(handlers::users::update_user))
        .route("/activity", get(handlers::users::list_activity))
        .route(
            "/rewards",
            get(handlers::rewards::list_rewards).post(handlers::rewards::grant_reward),
        )
        .route("/rewards/{id}/paid", put(handlers::rewards::mark_reward_paid));

    let protected_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/referrals", referral_routes)
        .nest("/admin", admin_routes)
        .route("/dashboard", get(handlers::dashboard::client_dashboard))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/rewards/me", get(handlers::rewards::my_rewards))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/units", get(handlers::units::list_units))
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
