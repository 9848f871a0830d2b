// src/models/unit.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::ToSchema;

// Unidade (franquia/filial). Dado de referência, só leitura pela API.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    #[schema(example = "Unidade Centro")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}
