// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    middleware::i18n::Locale,
    models::{auth::UserRole, referral::ReferralStatus},
};

// Erros de domínio. Cada variante tem um código estável usado na tradução.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Indicação não encontrada")]
    ReferralNotFound,

    #[error("Unidade não encontrada")]
    UnitNotFound,

    #[error("Código de indicação inexistente")]
    ReferralCodeNotFound,

    #[error("Recompensa não encontrada")]
    RewardNotFound,

    #[error("Indicação não aprovada ou de outro indicador")]
    RewardNotEligible,

    #[error("Parâmetros de consulta inválidos: {0}")]
    InvalidQuery(String),

    #[error("Acesso negado")]
    Forbidden,

    #[error("O cargo {role} não pode mover indicações para '{status}'")]
    StatusNotAllowed { role: UserRole, status: ReferralStatus },

    #[error("A indicação já está em '{0}'")]
    StatusUnchanged(ReferralStatus),

    #[error("Motivo da reprovação é obrigatório")]
    RejectionReasonRequired,

    #[error("Usuário não pode indicar a si mesmo")]
    SelfReferral,

    #[error("Este contato já foi indicado")]
    AlreadyReferred,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Falha ao gerar exportação: {0}")]
    ExportError(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Código estável do erro, usado como chave no `I18nStore`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::ReferralNotFound => "referral_not_found",
            AppError::UnitNotFound => "unit_not_found",
            AppError::ReferralCodeNotFound => "referral_code_not_found",
            AppError::RewardNotFound => "reward_not_found",
            AppError::RewardNotEligible => "reward_not_eligible",
            AppError::InvalidQuery(_) => "invalid_query",
            AppError::Forbidden => "forbidden",
            AppError::StatusNotAllowed { .. } => "status_not_allowed",
            AppError::StatusUnchanged(_) => "status_unchanged",
            AppError::RejectionReasonRequired => "rejection_reason_required",
            AppError::SelfReferral => "self_referral",
            AppError::AlreadyReferred => "already_referred",
            AppError::UniqueConstraintViolation(_) => "conflict",
            AppError::ExportError(_) => "export_failed",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::RejectionReasonRequired
            | AppError::SelfReferral
            | AppError::InvalidQuery(_)
            | AppError::ReferralCodeNotFound => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::StatusNotAllowed { .. } => StatusCode::FORBIDDEN,
            AppError::UserNotFound
            | AppError::ReferralNotFound
            | AppError::UnitNotFound
            | AppError::RewardNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists
            | AppError::AlreadyReferred
            | AppError::StatusUnchanged(_)
            | AppError::RewardNotEligible
            | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::ExportError(_)
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro na resposta HTTP traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status_code();
        let message = store.translate(&locale.0, self.code());

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Detalhes internos vão só para o log
            tracing::error!("Erro Interno do Servidor: {}", self);
            return ApiError { status, error: message, details: None };
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut fields: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    fields.insert(field.to_string(), messages);
                }
                Some(json!(fields))
            }
            AppError::StatusNotAllowed { role, status } => {
                Some(json!({ "role": role, "status": status }))
            }
            AppError::StatusUnchanged(current) => Some(json!({ "status": current })),
            AppError::InvalidQuery(reason) => Some(json!({ "reason": reason })),
            _ => None,
        };

        ApiError { status, error: message, details }
    }
}

// O erro que sai pela API: status + mensagem traduzida + detalhes opcionais
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Mapeia violação de unicidade do Postgres pelo nome da constraint.
pub fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_email_key") => AppError::EmailAlreadyExists,
                Some("referrals_referred_id_key") => AppError::AlreadyReferred,
                Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                None => AppError::UniqueConstraintViolation("desconhecida".to_string()),
            };
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "required"))]
        name: String,
    }

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let store = I18nStore::new();
        let errors = Payload { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.expect("details");
        assert_eq!(details["name"][0], "required");
    }

    #[test]
    fn workflow_errors_map_to_expected_status_codes() {
        let not_allowed = AppError::StatusNotAllowed {
            role: UserRole::Sdr,
            status: ReferralStatus::Aprovado,
        };
        assert_eq!(not_allowed.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::RejectionReasonRequired.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::StatusUnchanged(ReferralStatus::Indicacao).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::ReferralNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_errors_hide_details() {
        let store = I18nStore::new();
        let err = AppError::InternalServerError(anyhow::anyhow!("conexão caiu"));
        let api = err.to_api_error(&Locale("en".to_string()), &store);

        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.details.is_none());
        assert!(!api.error.contains("conexão"));
    }
}
