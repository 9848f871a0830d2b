// src/models/auth.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;
use utoipa::{IntoParams, ToSchema};

use crate::models::patch::deserialize_some;

// Mapeia o CREATE TYPE user_role do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role")]
pub enum UserRole {
    Cliente,
    Vendedor,
    #[sqlx(rename = "SDR")]
    #[serde(rename = "SDR")]
    Sdr,
    Contratos,
    Admin,
    #[sqlx(rename = "Super admin")]
    #[serde(rename = "Super admin")]
    SuperAdmin,
}

impl UserRole {
    pub const ALL: [UserRole; 6] = [
        UserRole::Cliente,
        UserRole::Vendedor,
        UserRole::Sdr,
        UserRole::Contratos,
        UserRole::Admin,
        UserRole::SuperAdmin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UserRole::Cliente => "Cliente",
            UserRole::Vendedor => "Vendedor",
            UserRole::Sdr => "SDR",
            UserRole::Contratos => "Contratos",
            UserRole::Admin => "Admin",
            UserRole::SuperAdmin => "Super admin",
        }
    }

    /// Equipe interna: enxerga todas as indicações.
    pub fn is_staff(self) -> bool {
        matches!(
            self,
            UserRole::Sdr | UserRole::Contratos | UserRole::Admin | UserRole::SuperAdmin
        )
    }

    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin | UserRole::SuperAdmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "maria@email.com")]
    pub email: String,

    // Leads criados por indicação ainda não têm senha
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub password_hash: Option<String>,

    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    pub role: UserRole,
    pub unit_id: Option<Uuid>,

    #[schema(example = "A1B2C3D4")]
    pub referral_code: String,
    pub referred_by: Option<Uuid>,

    pub total_referrals: i32,
    pub approved_referrals: i32,
    pub is_resolve_customer: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    #[schema(example = "segredo123")]
    pub password: String,

    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub full_name: String,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    pub unit_id: Option<Uuid>,

    #[serde(default)]
    pub is_resolve_customer: bool,

    /// Código de quem convidou (vem do link de indicação)
    #[schema(example = "A1B2C3D4")]
    pub referral_code: Option<String>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@email.com")]
    pub email: String,
    #[validate(length(min = 6, message = "password_too_short"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLinkResponse {
    #[schema(example = "A1B2C3D4")]
    pub code: String,
    #[schema(example = "https://indica.exemplo.com/cadastro?ref=A1B2C3D4")]
    pub link: String,
    /// QR Code do link, em SVG
    pub qr_svg: String,
}

// Edição de usuário pelo painel administrativo
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 2, message = "required"))]
    pub full_name: Option<String>,

    /// `null` apaga o telefone
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "(11) 99999-8888")]
    pub phone: Option<Option<String>>,

    pub role: Option<UserRole>,

    /// `null` desvincula da unidade
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub unit_id: Option<Option<Uuid>>,

    pub is_resolve_customer: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub unit_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.unit_id.is_some() && self.unit_id != user.unit_id {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [Some(user.full_name.as_str()), Some(user.email.as_str()), user.phone.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}

#[cfg(test)]
pub(crate) fn sample_user(role: UserRole) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: "ana@exemplo.com".to_string(),
        password_hash: None,
        full_name: "Ana Souza".to_string(),
        phone: Some("11988887777".to_string()),
        role,
        unit_id: None,
        referral_code: "ANA12345".to_string(),
        referred_by: None,
        total_referrals: 0,
        approved_referrals: 0,
        is_resolve_customer: false,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_with_their_display_names() {
        assert_eq!(serde_json::to_string(&UserRole::SuperAdmin).unwrap(), "\"Super admin\"");
        assert_eq!(serde_json::to_string(&UserRole::Sdr).unwrap(), "\"SDR\"");
        let parsed: UserRole = serde_json::from_str("\"Contratos\"").unwrap();
        assert_eq!(parsed, UserRole::Contratos);
    }

    #[test]
    fn staff_and_admin_groups() {
        let staff: Vec<_> = UserRole::ALL.into_iter().filter(|r| r.is_staff()).collect();
        assert_eq!(
            staff,
            vec![UserRole::Sdr, UserRole::Contratos, UserRole::Admin, UserRole::SuperAdmin]
        );
        assert!(!UserRole::Contratos.is_admin());
        assert!(UserRole::SuperAdmin.is_admin());
    }

    #[test]
    fn user_filter_is_conjunctive() {
        let unit = Uuid::new_v4();
        let mut user = sample_user(UserRole::Vendedor);
        user.unit_id = Some(unit);

        let filter = UserFilter {
            role: Some(UserRole::Vendedor),
            unit_id: Some(unit),
            search: Some("SOUZA".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&user));

        let wrong_role = UserFilter { role: Some(UserRole::Admin), ..filter };
        assert!(!wrong_role.matches(&user));
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let mut user = sample_user(UserRole::Cliente);
        user.password_hash = Some("hash".to_string());
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "Cliente");
    }
}
