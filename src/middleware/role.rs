// src/middleware/role.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::UserRole,
};

/// Regra de acesso por cargo.
pub trait RoleGate: Send + Sync + 'static {
    fn allows(role: UserRole) -> bool;
}

/// Extrator que barra a requisição quando o cargo não passa no `RoleGate`.
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleGate,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_request_parts(parts, state)
            .await
            .unwrap_or_default();

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)
            .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

        if !T::allows(user.0.role) {
            tracing::warn!("⛔ {} ({}) barrado pela regra de cargo", user.0.id, user.0.role);
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// REGRAS
// ---

/// SDR, Contratos, Admin e Super admin.
pub struct StaffOnly;
impl RoleGate for StaffOnly {
    fn allows(role: UserRole) -> bool { role.is_staff() }
}

pub struct AdminOnly;
impl RoleGate for AdminOnly {
    fn allows(role: UserRole) -> bool { role.is_admin() }
}
