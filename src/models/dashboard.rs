// src/models/dashboard.rs

use serde::Serialize;
use uuid::Uuid;
use utoipa::ToSchema;

use crate::models::referral::{ReferralDetail, ReferralStatus};

// 1. Contagem por estágio do funil (os cards coloridos)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: ReferralStatus,
    pub label: &'static str,
    pub color: &'static str,
    pub count: i64,
}

// 2. Contagem por unidade (relatório regional)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitCount {
    pub unit_id: Option<Uuid>,
    #[schema(example = "Unidade Centro")]
    pub unit_name: String,
    pub total: i64,
    pub approved: i64,
}

// 3. Ranking de quem mais indica
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub user_id: Uuid,
    pub full_name: String,
    pub total: i64,
    pub approved: i64,
}

// 4. Série mensal (gráfico de barras)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyEntry {
    #[schema(example = "2025-03")]
    pub month: String,
    pub total: i64,
    pub approved: i64,
}

// Painel do cliente/parceiro
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDashboard {
    pub referral_code: String,
    pub referral_link: String,
    pub total_referrals: i32,
    pub approved_referrals: i32,
    pub by_status: Vec<StatusCount>,
    pub recent: Vec<ReferralDetail>,
}

// Painel administrativo
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAnalytics {
    pub total_users: i64,
    pub total_referrals: i64,
    pub approved_referrals: i64,
    /// Aprovadas / total, em porcentagem
    pub conversion_rate: f64,
    pub by_status: Vec<StatusCount>,
    pub by_unit: Vec<UnitCount>,
    pub ranking: Vec<RankingEntry>,
    pub monthly: Vec<MonthlyEntry>,
}
