// src/handlers/rewards.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        role::{AdminOnly, RequireRole},
        query::ValidQuery,
    },
    models::reward::{GrantRewardPayload, Reward},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RewardQuery {
    pub user_id: Option<Uuid>,
}

// GET /api/rewards/me
#[utoipa::path(
    get,
    path = "/api/rewards/me",
    tag = "Rewards",
    responses(
        (status = 200, description = "Recompensas do usuário logado", body = Vec<Reward>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_rewards(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let rewards = app_state
        .reward_service
        .list_for(Some(user.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rewards)))
}

// GET /api/admin/rewards
#[utoipa::path(
    get,
    path = "/api/admin/rewards",
    tag = "Admin",
    params(RewardQuery),
    responses(
        (status = 200, description = "Recompensas concedidas", body = Vec<Reward>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_rewards(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    ValidQuery(query): ValidQuery<RewardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rewards = app_state
        .reward_service
        .list_for(query.user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(rewards)))
}

// POST /api/admin/rewards
#[utoipa::path(
    post,
    path = "/api/admin/rewards",
    tag = "Admin",
    request_body = GrantRewardPayload,
    responses(
        (status = 201, description = "Recompensa concedida", body = Reward),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn grant_reward(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(actor): AuthenticatedUser,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<GrantRewardPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reward = app_state
        .reward_service
        .grant(&actor, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(reward)))
}

// PUT /api/admin/rewards/{id}/paid
#[utoipa::path(
    put,
    path = "/api/admin/rewards/{id}/paid",
    tag = "Admin",
    params(("id" = Uuid, Path, description = "ID da recompensa")),
    responses(
        (status = 200, description = "Recompensa marcada como paga", body = Reward),
        (status = 404, description = "Recompensa não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_reward_paid(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let reward = app_state
        .reward_service
        .mark_paid(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(reward)))
}
