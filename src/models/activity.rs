// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;
use utoipa::{IntoParams, ToSchema};

// Ações registradas na trilha de auditoria
pub const ACTION_REGISTER: &str = "register";
pub const ACTION_LOGIN: &str = "login";
pub const ACTION_REFERRAL_CREATED: &str = "referral_created";
pub const ACTION_STATUS_CHANGED: &str = "referral_status_changed";
pub const ACTION_USER_UPDATED: &str = "user_updated";
pub const ACTION_REWARD_GRANTED: &str = "reward_granted";

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityLog {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "referral_status_changed")]
    pub action: String,
    pub details: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ActivityQuery {
    pub user_id: Option<Uuid>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}
