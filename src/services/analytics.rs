// src/services/analytics.rs
//
// Agregações dos painéis, feitas em memória sobre as indicações carregadas.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::models::{
    dashboard::{MonthlyEntry, RankingEntry, StatusCount, UnitCount},
    referral::{ReferralDetail, ReferralStatus},
};

const NO_UNIT_LABEL: &str = "Sem unidade";

/// Uma entrada por estágio, na ordem do funil, incluindo os zerados.
pub fn count_by_status(referrals: &[ReferralDetail]) -> Vec<StatusCount> {
    ReferralStatus::ALL
        .into_iter()
        .map(|status| StatusCount {
            status,
            label: status.label(),
            color: status.color(),
            count: referrals.iter().filter(|r| r.status == status).count() as i64,
        })
        .collect()
}

pub fn count_by_unit(referrals: &[ReferralDetail]) -> Vec<UnitCount> {
    let mut by_unit: HashMap<Option<Uuid>, UnitCount> = HashMap::new();
    for referral in referrals {
        let entry = by_unit.entry(referral.unit_id).or_insert_with(|| UnitCount {
            unit_id: referral.unit_id,
            unit_name: referral
                .unit_name
                .clone()
                .unwrap_or_else(|| NO_UNIT_LABEL.to_string()),
            total: 0,
            approved: 0,
        });
        entry.total += 1;
        if referral.status == ReferralStatus::Aprovado {
            entry.approved += 1;
        }
    }

    let mut units: Vec<_> = by_unit.into_values().collect();
    units.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.unit_name.cmp(&b.unit_name)));
    units
}

/// Ranking de indicadores: aprovadas, depois total, depois nome.
pub fn rank_referrers(referrals: &[ReferralDetail], limit: usize) -> Vec<RankingEntry> {
    let mut by_referrer: HashMap<Uuid, RankingEntry> = HashMap::new();
    for referral in referrals {
        let entry = by_referrer
            .entry(referral.referrer_id)
            .or_insert_with(|| RankingEntry {
                user_id: referral.referrer_id,
                full_name: referral.referrer_name.clone(),
                total: 0,
                approved: 0,
            });
        entry.total += 1;
        if referral.status == ReferralStatus::Aprovado {
            entry.approved += 1;
        }
    }

    let mut ranking: Vec<_> = by_referrer.into_values().collect();
    ranking.sort_by(|a, b| {
        b.approved
            .cmp(&a.approved)
            .then_with(|| b.total.cmp(&a.total))
            .then_with(|| a.full_name.cmp(&b.full_name))
    });
    ranking.truncate(limit);
    ranking
}

/// Série dos últimos `months` meses até `now`, do mais antigo ao atual.
pub fn monthly_series(referrals: &[ReferralDetail], now: DateTime<Utc>, months: u32) -> Vec<MonthlyEntry> {
    let mut keys = Vec::with_capacity(months as usize);
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..months {
        keys.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    keys.reverse();

    keys.into_iter()
        .map(|(year, month)| {
            let in_month = referrals
                .iter()
                .filter(|r| r.created_at.year() == year && r.created_at.month() == month);
            let (total, approved) = in_month.fold((0, 0), |(total, approved), r| {
                (total + 1, approved + i64::from(r.status == ReferralStatus::Aprovado))
            });
            MonthlyEntry {
                month: format!("{year:04}-{month:02}"),
                total,
                approved,
            }
        })
        .collect()
}

/// Percentual de aprovadas, com uma casa decimal.
pub fn conversion_rate(total: i64, approved: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    ((approved as f64 / total as f64) * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::referral::sample_detail;
    use chrono::TimeZone;

    #[test]
    fn status_counts_cover_all_stages_in_order() {
        let rows = vec![
            sample_detail(ReferralStatus::Aprovado, None, "A"),
            sample_detail(ReferralStatus::Aprovado, None, "B"),
            sample_detail(ReferralStatus::Indicacao, None, "C"),
        ];
        let counts = count_by_status(&rows);

        let statuses: Vec<_> = counts.iter().map(|c| c.status).collect();
        assert_eq!(statuses, ReferralStatus::ALL.to_vec());
        let as_map: Vec<_> = counts.iter().map(|c| c.count).collect();
        assert_eq!(as_map, vec![1, 0, 0, 0, 2]);
    }

    #[test]
    fn ranking_orders_by_approved_then_total() {
        let mut rows = Vec::new();
        let ana = Uuid::new_v4();
        let bia = Uuid::new_v4();
        let caio = Uuid::new_v4();
        for (referrer, name, status) in [
            (ana, "Ana", ReferralStatus::Aprovado),
            (bia, "Bia", ReferralStatus::Aprovado),
            (bia, "Bia", ReferralStatus::Indicacao),
            (caio, "Caio", ReferralStatus::Indicacao),
            (caio, "Caio", ReferralStatus::Indicacao),
            (caio, "Caio", ReferralStatus::Indicacao),
        ] {
            let mut row = sample_detail(status, None, "Lead");
            row.referrer_id = referrer;
            row.referrer_name = name.to_string();
            rows.push(row);
        }

        let ranking = rank_referrers(&rows, 10);
        let names: Vec<_> = ranking.iter().map(|r| r.full_name.as_str()).collect();
        assert_eq!(names, vec!["Bia", "Ana", "Caio"]);
        assert_eq!(ranking[0].total, 2);
        assert_eq!(ranking[0].approved, 1);

        assert_eq!(rank_referrers(&rows, 2).len(), 2);
    }

    #[test]
    fn units_group_missing_unit_together() {
        let centro = Uuid::new_v4();
        let rows = vec![
            sample_detail(ReferralStatus::Aprovado, Some(centro), "A"),
            sample_detail(ReferralStatus::Indicacao, Some(centro), "B"),
            sample_detail(ReferralStatus::Indicacao, None, "C"),
        ];
        let units = count_by_unit(&rows);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].unit_id, Some(centro));
        assert_eq!(units[0].total, 2);
        assert_eq!(units[0].approved, 1);
        assert_eq!(units[1].unit_name, NO_UNIT_LABEL);
    }

    #[test]
    fn monthly_series_crosses_year_boundary_and_keeps_empty_months() {
        let now = Utc.with_ymd_and_hms(2025, 2, 10, 12, 0, 0).unwrap();
        let mut january = sample_detail(ReferralStatus::Aprovado, None, "A");
        january.created_at = Utc.with_ymd_and_hms(2025, 1, 5, 9, 0, 0).unwrap();
        let mut november = sample_detail(ReferralStatus::Indicacao, None, "B");
        november.created_at = Utc.with_ymd_and_hms(2024, 11, 30, 9, 0, 0).unwrap();

        let series = monthly_series(&[january, november], now, 4);
        let months: Vec<_> = series.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(months, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);
        let totals: Vec<_> = series.iter().map(|m| (m.total, m.approved)).collect();
        assert_eq!(totals, vec![(1, 0), (0, 0), (1, 1), (0, 0)]);
    }

    #[test]
    fn conversion_rate_handles_empty_totals() {
        assert_eq!(conversion_rate(0, 0), 0.0);
        assert_eq!(conversion_rate(3, 1), 33.3);
        assert_eq!(conversion_rate(4, 4), 100.0);
    }
}
