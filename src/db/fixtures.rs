// src/db/fixtures.rs
//
// Dados de apoio para os testes que rodam contra o Postgres (`#[sqlx::test]`).

use sqlx::PgPool;

use crate::{
    config::{AppConfig, AppState},
    db::{user_repo::NewUser, UserRepository},
    models::auth::{User, UserRole},
    services::auth::generate_referral_code,
};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: String::new(),
        jwt_secret: "segredo-de-teste".to_string(),
        server_addr: "127.0.0.1:0".to_string(),
        app_base_url: "http://localhost:5173".to_string(),
        push: None,
    }
}

pub fn state(pool: &PgPool) -> AppState {
    AppState::build(pool.clone(), &test_config())
}

pub async fn insert_user(pool: &PgPool, email: &str, role: UserRole) -> User {
    let code = generate_referral_code();
    UserRepository::new(pool.clone())
        .create_user(
            pool,
            NewUser {
                email,
                password_hash: Some("hash"),
                full_name: email.split('@').next().unwrap_or(email),
                phone: None,
                role,
                unit_id: None,
                referral_code: &code,
                referred_by: None,
                is_resolve_customer: false,
            },
        )
        .await
        .unwrap()
}

pub async fn approved_count(pool: &PgPool, user_id: uuid::Uuid) -> i32 {
    let (approved,): (i32,) = sqlx::query_as("SELECT approved_referrals FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap();
    approved
}
