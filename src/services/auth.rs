// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, ActivityRepository, ReferralRepository, UnitRepository, UserRepository},
    models::{
        activity::{ACTION_LOGIN, ACTION_REFERRAL_CREATED, ACTION_REGISTER},
        auth::{Claims, RegisterUserPayload, User, UserRole},
    },
};

/// Código curto e legível para o link de indicação.
pub fn generate_referral_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    referral_repo: ReferralRepository,
    unit_repo: UnitRepository,
    activity_repo: ActivityRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        referral_repo: ReferralRepository,
        unit_repo: UnitRepository,
        activity_repo: ActivityRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, referral_repo, unit_repo, activity_repo, jwt_secret, pool }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        if let Some(unit_id) = payload.unit_id {
            if !self.unit_repo.exists(unit_id).await? {
                return Err(AppError::UnitNotFound);
            }
        }

        // 1. Hashing fora da transação, num thread de bloqueio
        let password = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        // 2. Quem convidou (código vindo do link)
        let invitation_code = payload
            .referral_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty());
        let inviter = match invitation_code {
            Some(code) => Some(
                self.user_repo
                    .find_by_referral_code(&mut *tx, code)
                    .await?
                    .ok_or(AppError::ReferralCodeNotFound)?,
            ),
            None => None,
        };

        // 3. Cria o usuário ou assume o cadastro do lead com o mesmo e-mail
        let existing = self.user_repo.find_by_email(&mut *tx, &payload.email).await?;
        let user = match existing {
            Some(lead) if lead.password_hash.is_none() => self
                .user_repo
                .claim_lead(
                    &mut *tx,
                    lead.id,
                    &hashed_password,
                    &payload.full_name,
                    payload.phone.as_deref(),
                    payload.unit_id,
                    payload.is_resolve_customer,
                )
                .await?
                .ok_or(AppError::EmailAlreadyExists)?,
            Some(_) => return Err(AppError::EmailAlreadyExists),
            None => {
                let referral_code = generate_referral_code();
                self.user_repo
                    .create_user(
                        &mut *tx,
                        NewUser {
                            email: payload.email.trim(),
                            password_hash: Some(&hashed_password),
                            full_name: payload.full_name.trim(),
                            phone: payload.phone.as_deref(),
                            role: UserRole::Cliente,
                            unit_id: payload.unit_id,
                            referral_code: &referral_code,
                            referred_by: inviter.as_ref().map(|i| i.id),
                            is_resolve_customer: payload.is_resolve_customer,
                        },
                    )
                    .await?
            }
        };

        // 4. Cadastro pelo link vira uma indicação do convidante
        if let Some(inviter) = &inviter {
            if inviter.id == user.id {
                return Err(AppError::SelfReferral);
            }
            if !self.referral_repo.exists_for_referred(&mut *tx, user.id).await? {
                let referral = self
                    .referral_repo
                    .create(&mut *tx, inviter.id, user.id, user.unit_id.or(inviter.unit_id))
                    .await?;
                self.user_repo.increment_total_referrals(&mut *tx, inviter.id).await?;
                self.activity_repo
                    .log(
                        &mut *tx,
                        inviter.id,
                        ACTION_REFERRAL_CREATED,
                        json!({ "referralId": referral.id, "referredId": user.id, "via": "link" }),
                    )
                    .await?;
            }
        }

        self.activity_repo
            .log(&mut *tx, user.id, ACTION_REGISTER, json!({ "invitedBy": inviter.map(|i| i.id) }))
            .await?;

        tx.commit().await?;
        tracing::info!("👤 Novo cadastro: {}", user.id);

        self.create_token(user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        // Lead sem senha ainda não pode entrar
        let password_hash = user.password_hash.clone().ok_or(AppError::InvalidCredentials)?;
        let password = password.to_owned();

        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.activity_repo
            .log(&self.pool, user.id, ACTION_LOGIN, json!({}))
            .await?;

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        encode_token(user_id, &self.jwt_secret)
    }
}

pub(crate) fn encode_token(user_id: Uuid, secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(7);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_ref()))?)
}

pub(crate) fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referral_codes_are_eight_uppercase_hex_chars() {
        let code = generate_referral_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_ne!(code, generate_referral_code());
    }

    #[test]
    fn token_round_trip_keeps_subject() {
        let user_id = Uuid::new_v4();
        let token = encode_token(user_id, "segredo").unwrap();
        let claims = decode_token(&token, "segredo").unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = encode_token(Uuid::new_v4(), "segredo").unwrap();
        assert!(matches!(decode_token(&token, "outro"), Err(AppError::InvalidToken)));
        assert!(matches!(decode_token("lixo", "segredo"), Err(AppError::InvalidToken)));
    }
}
