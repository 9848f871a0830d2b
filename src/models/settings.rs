// src/models/settings.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use utoipa::ToSchema;

use crate::models::patch::deserialize_some;

// Configuração do programa (linha única na tabela `settings`)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgramSettings {
    #[schema(example = "Programa de Indicações")]
    pub program_name: String,

    /// Sobrepõe o APP_BASE_URL na montagem do link de indicação
    #[schema(example = "https://indica.exemplo.com")]
    pub referral_base_url: Option<String>,

    #[schema(value_type = f64, example = 150.0)]
    pub reward_per_approval: Decimal,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "Indique e Ganhe")]
    pub program_name: Option<String>,

    /// `null` volta a usar o APP_BASE_URL
    #[validate(url(message = "invalid_url"))]
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>, example = "https://indica.exemplo.com")]
    pub referral_base_url: Option<Option<String>>,

    #[schema(value_type = Option<f64>, example = 200.0)]
    pub reward_per_approval: Option<Decimal>,
}
