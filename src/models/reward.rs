// src/models/reward.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: Uuid,
    pub user_id: Uuid,
    pub referral_id: Option<Uuid>,
    #[schema(value_type = f64, example = 150.0)]
    pub amount: Decimal,
    pub description: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GrantRewardPayload {
    pub user_id: Uuid,
    pub referral_id: Option<Uuid>,
    /// Sem valor, usa a recompensa padrão por aprovação das configurações
    #[schema(value_type = Option<f64>, example = 150.0)]
    pub amount: Option<Decimal>,
    #[validate(length(max = 255, message = "too_long"))]
    pub description: Option<String>,
}
