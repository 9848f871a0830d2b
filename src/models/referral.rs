// src/models/referral.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;
use utoipa::{IntoParams, ToSchema};

// --- ENUMS ---

// Mapeia o CREATE TYPE referral_status do banco.
// A ordem das variantes é a ordem do funil.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "referral_status")]
pub enum ReferralStatus {
    #[sqlx(rename = "Indicação")]
    #[serde(rename = "Indicação")]
    Indicacao,
    #[sqlx(rename = "Contato comercial")]
    #[serde(rename = "Contato comercial")]
    ContatoComercial,
    #[sqlx(rename = "Em negociação")]
    #[serde(rename = "Em negociação")]
    EmNegociacao,
    #[sqlx(rename = "Sem Interesse ou Reprovado")]
    #[serde(rename = "Sem Interesse ou Reprovado")]
    SemInteresse,
    Aprovado,
}

impl ReferralStatus {
    pub const ALL: [ReferralStatus; 5] = [
        ReferralStatus::Indicacao,
        ReferralStatus::ContatoComercial,
        ReferralStatus::EmNegociacao,
        ReferralStatus::SemInteresse,
        ReferralStatus::Aprovado,
    ];

    /// Estágio de reprovação: exige motivo.
    pub const REJECTED: ReferralStatus = ReferralStatus::SemInteresse;

    pub fn label(self) -> &'static str {
        match self {
            ReferralStatus::Indicacao => "Indicação",
            ReferralStatus::ContatoComercial => "Contato comercial",
            ReferralStatus::EmNegociacao => "Em negociação",
            ReferralStatus::SemInteresse => "Sem Interesse ou Reprovado",
            ReferralStatus::Aprovado => "Aprovado",
        }
    }

    // Cores usadas pelos badges do frontend
    pub fn color(self) -> &'static str {
        match self {
            ReferralStatus::Indicacao => "blue",
            ReferralStatus::ContatoComercial => "yellow",
            ReferralStatus::EmNegociacao => "orange",
            ReferralStatus::SemInteresse => "red",
            ReferralStatus::Aprovado => "green",
        }
    }

    pub fn is_rejection(self) -> bool {
        self == Self::REJECTED
    }

    pub fn presentation(self) -> StatusOption {
        StatusOption {
            status: self,
            label: self.label(),
            color: self.color(),
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusOption {
    pub status: ReferralStatus,
    #[schema(example = "Em negociação")]
    pub label: &'static str,
    #[schema(example = "orange")]
    pub color: &'static str,
}

// --- INDICAÇÃO ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    pub referrer_id: Uuid,
    pub referred_id: Uuid,
    pub status: ReferralStatus,
    pub rejection_reason: Option<String>,
    pub unit_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Indicação com os dados de quem indicou, de quem foi indicado e da unidade
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferralDetail {
    pub id: Uuid,
    pub status: ReferralStatus,
    pub rejection_reason: Option<String>,
    pub unit_id: Option<Uuid>,
    pub unit_name: Option<String>,

    pub referrer_id: Uuid,
    pub referrer_name: String,
    pub referrer_email: String,
    pub referrer_phone: Option<String>,

    pub referred_id: Uuid,
    pub referred_name: String,
    pub referred_email: String,
    pub referred_phone: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- PAYLOADS ---

// Formulário de indicação de um lead
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralPayload {
    #[validate(length(min = 2, message = "required"))]
    #[schema(example = "João Pereira")]
    pub full_name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "joao@email.com")]
    pub email: String,

    #[validate(length(min = 8, message = "invalid_phone"))]
    #[schema(example = "(11) 98888-7777")]
    pub phone: Option<String>,

    pub unit_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    pub status: ReferralStatus,

    #[schema(example = "cliente desistiu")]
    pub rejection_reason: Option<String>,
}

// --- FILTROS ---

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReferralFilter {
    pub unit_id: Option<Uuid>,
    pub status: Option<ReferralStatus>,
    /// Busca por nome, e-mail ou telefone (indicado ou indicador)
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ReferralFilter {
    /// Todos os filtros ativos precisam bater.
    pub fn matches(&self, referral: &ReferralDetail) -> bool {
        if self.unit_id.is_some() && self.unit_id != referral.unit_id {
            return false;
        }
        if self.status.is_some_and(|status| status != referral.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [
                    Some(referral.referred_name.as_str()),
                    Some(referral.referred_email.as_str()),
                    referral.referred_phone.as_deref(),
                    Some(referral.referrer_name.as_str()),
                    Some(referral.referrer_email.as_str()),
                    referral.referrer_phone.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }

    pub fn apply(&self, referrals: Vec<ReferralDetail>) -> Vec<ReferralDetail> {
        referrals.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "indicacoes.xlsx",
            ExportFormat::Csv => "indicacoes.csv",
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    pub format: Option<ExportFormat>,
}

#[cfg(test)]
pub(crate) fn sample_referral(referrer_id: Uuid, status: ReferralStatus) -> Referral {
    let now = Utc::now();
    Referral {
        id: Uuid::new_v4(),
        referrer_id,
        referred_id: Uuid::new_v4(),
        status,
        rejection_reason: status
            .is_rejection()
            .then(|| "cliente desistiu".to_string()),
        unit_id: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
pub(crate) fn sample_detail(
    status: ReferralStatus,
    unit_id: Option<Uuid>,
    referred_name: &str,
) -> ReferralDetail {
    let now = Utc::now();
    ReferralDetail {
        id: Uuid::new_v4(),
        status,
        rejection_reason: status
            .is_rejection()
            .then(|| "cliente desistiu".to_string()),
        unit_id,
        unit_name: unit_id.map(|_| "Unidade Centro".to_string()),
        referrer_id: Uuid::new_v4(),
        referrer_name: "Ana Souza".to_string(),
        referrer_email: "ana@exemplo.com".to_string(),
        referrer_phone: Some("11988887777".to_string()),
        referred_id: Uuid::new_v4(),
        referred_name: referred_name.to_string(),
        referred_email: format!("{}@lead.com", referred_name.to_lowercase().replace(' ', ".")),
        referred_phone: None,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_serialize_with_pipeline_labels() {
        for status in ReferralStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
        }
    }

    #[test]
    fn pipeline_order_matches_declaration() {
        let mut sorted = ReferralStatus::ALL.to_vec();
        sorted.sort();
        assert_eq!(sorted, ReferralStatus::ALL.to_vec());
        assert!(ReferralStatus::Indicacao < ReferralStatus::EmNegociacao);
    }

    #[test]
    fn every_status_has_a_distinct_color() {
        let mut colors: Vec<_> = ReferralStatus::ALL.iter().map(|s| s.color()).collect();
        colors.sort();
        colors.dedup();
        assert_eq!(colors.len(), 5);
    }

    #[test]
    fn filters_compose_conjunctively() {
        let centro = Uuid::new_v4();
        let norte = Uuid::new_v4();
        let rows = vec![
            sample_detail(ReferralStatus::Aprovado, Some(centro), "Carlos Lima"),
            sample_detail(ReferralStatus::Aprovado, Some(norte), "Carla Dias"),
            sample_detail(ReferralStatus::Indicacao, Some(centro), "Carlos Melo"),
            sample_detail(ReferralStatus::Aprovado, Some(centro), "Bruno Reis"),
        ];

        let filter = ReferralFilter {
            unit_id: Some(centro),
            status: Some(ReferralStatus::Aprovado),
            search: Some("carl".to_string()),
            ..Default::default()
        };
        let result = filter.apply(rows.clone());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].referred_name, "Carlos Lima");

        // Cada filtro isolado deixa passar mais linhas
        let only_search = ReferralFilter { search: Some("carl".to_string()), ..Default::default() };
        assert_eq!(only_search.apply(rows.clone()).len(), 3);
        let only_unit = ReferralFilter { unit_id: Some(centro), ..Default::default() };
        assert_eq!(only_unit.apply(rows.clone()).len(), 3);
        assert_eq!(ReferralFilter::default().apply(rows).len(), 4);
    }

    #[test]
    fn blank_search_is_ignored_and_search_covers_referrer() {
        let row = sample_detail(ReferralStatus::Indicacao, None, "Carlos Lima");
        let blank = ReferralFilter { search: Some("   ".to_string()), ..Default::default() };
        assert!(blank.matches(&row));

        let by_referrer = ReferralFilter { search: Some("ANA@".to_string()), ..Default::default() };
        assert!(by_referrer.matches(&row));

        let by_phone = ReferralFilter { search: Some("98888".to_string()), ..Default::default() };
        assert!(by_phone.matches(&row));
    }
}
