// src/handlers/referrals.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        role::{RequireRole, StaffOnly},
        query::ValidQuery,
    },
    models::{
        pagination::Page,
        referral::{
            CreateReferralPayload, ExportQuery, Referral, ReferralDetail, ReferralFilter,
            StatusOption, UpdateStatusPayload,
        },
    },
    services::export_service,
};

// =============================================================================
//  ÁREA 1: CADASTRO E CONSULTA
// =============================================================================

// POST /api/referrals
#[utoipa::path(
    post,
    path = "/api/referrals",
    tag = "Referrals",
    request_body = CreateReferralPayload,
    responses(
        (status = 201, description = "Indicação registrada", body = Referral),
        (status = 400, description = "Dados inválidos ou autoindicação"),
        (status = 409, description = "Contato já indicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_referral(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateReferralPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let referral = app_state
        .referral_service
        .create_referral(&user, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(referral)))
}

// GET /api/referrals
#[utoipa::path(
    get,
    path = "/api/referrals",
    tag = "Referrals",
    params(ReferralFilter),
    responses(
        (status = 200, description = "Indicações visíveis, filtradas e paginadas", body = Page<ReferralDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_referrals(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    ValidQuery(filter): ValidQuery<ReferralFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let page = app_state
        .referral_service
        .list(&user, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// GET /api/referrals/{id}
#[utoipa::path(
    get,
    path = "/api/referrals/{id}",
    tag = "Referrals",
    params(("id" = Uuid, Path, description = "ID da indicação")),
    responses(
        (status = 200, description = "Indicação", body = ReferralDetail),
        (status = 404, description = "Indicação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_referral(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .referral_service
        .get(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// =============================================================================
//  ÁREA 2: STATUS
// =============================================================================

// GET /api/referrals/{id}/status-options
#[utoipa::path(
    get,
    path = "/api/referrals/{id}/status-options",
    tag = "Referrals",
    params(("id" = Uuid, Path, description = "ID da indicação")),
    responses(
        (status = 200, description = "Status que o cargo pode aplicar", body = Vec<StatusOption>)
    ),
    security(("api_jwt" = []))
)]
pub async fn status_options(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let options = app_state
        .referral_service
        .status_options(&user, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(options)))
}

// PUT /api/referrals/{id}/status
#[utoipa::path(
    put,
    path = "/api/referrals/{id}/status",
    tag = "Referrals",
    params(("id" = Uuid, Path, description = "ID da indicação")),
    request_body = UpdateStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Referral),
        (status = 400, description = "Motivo da reprovação ausente"),
        (status = 403, description = "Cargo não pode aplicar este status"),
        (status = 409, description = "Indicação já está neste status")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<StaffOnly>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let referral = app_state
        .referral_service
        .update_status(&user, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(referral)))
}

// =============================================================================
//  ÁREA 3: EXPORTAÇÃO
// =============================================================================

// GET /api/referrals/export
#[utoipa::path(
    get,
    path = "/api/referrals/export",
    tag = "Referrals",
    params(ReferralFilter, ExportQuery),
    responses(
        (status = 200, description = "Arquivo XLSX ou CSV com as indicações filtradas"),
        (status = 403, description = "Somente equipe interna")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_referrals(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequireRole<StaffOnly>,
    ValidQuery(filter): ValidQuery<ReferralFilter>,
    ValidQuery(export): ValidQuery<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let format = export.format.unwrap_or_default();

    let rows = app_state
        .referral_service
        .export_rows(&user, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let count = rows.len();

    // A planilha é montada em memória fora do executor
    let bytes = tokio::task::spawn_blocking(move || export_service::export(format, &rows))
        .await
        .map_err(|e| AppError::InternalServerError(e.into()))
        .and_then(|result| result)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("📤 {} exportou {} indicações ({})", user.id, count, format.file_name());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    ))
}
