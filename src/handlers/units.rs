// src/handlers/units.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError, config::AppState, middleware::i18n::Locale, models::unit::Unit,
};

// GET /api/units (público: usado no formulário de cadastro)
#[utoipa::path(
    get,
    path = "/api/units",
    tag = "Units",
    responses(
        (status = 200, description = "Unidades cadastradas", body = Vec<Unit>)
    )
)]
pub async fn list_units(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let units = app_state
        .unit_repo
        .list()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(units)))
}
