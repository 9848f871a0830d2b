// src/services/dashboard_service.rs

use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;

use crate::{
    common::{error::AppError, retry::with_linear_backoff},
    db::{ReferralRepository, UserRepository},
    models::{
        auth::User,
        dashboard::{AdminAnalytics, ClientDashboard},
        referral::ReferralStatus,
    },
    services::{analytics, user_service::UserService},
};

// Carga inicial do painel: 3 tentativas, backoff linear
const FETCH_ATTEMPTS: u32 = 3;
const FETCH_BACKOFF: Duration = Duration::from_millis(500);

const RECENT_LIMIT: usize = 5;
const RANKING_LIMIT: usize = 10;
const MONTHS_IN_SERIES: u32 = 12;

#[derive(Clone)]
pub struct DashboardService {
    referral_repo: ReferralRepository,
    user_repo: UserRepository,
    user_service: UserService,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(
        referral_repo: ReferralRepository,
        user_repo: UserRepository,
        user_service: UserService,
        pool: PgPool,
    ) -> Self {
        Self { referral_repo, user_repo, user_service, pool }
    }

    // 1. Painel do cliente/parceiro
    pub async fn client_dashboard(&self, user: &User) -> Result<ClientDashboard, AppError> {
        let (repo, pool, user_id) = (&self.referral_repo, &self.pool, user.id);
        let referrals = with_linear_backoff(FETCH_ATTEMPTS, FETCH_BACKOFF, move || {
            repo.list_details(pool, Some(user_id))
        })
        .await?;

        let referral_link = self.user_service.referral_link_for(&user.referral_code).await?;
        let by_status = analytics::count_by_status(&referrals);

        Ok(ClientDashboard {
            referral_code: user.referral_code.clone(),
            referral_link,
            total_referrals: user.total_referrals,
            approved_referrals: user.approved_referrals,
            by_status,
            recent: referrals.into_iter().take(RECENT_LIMIT).collect(),
        })
    }

    // 2. Painel administrativo
    pub async fn admin_analytics(&self) -> Result<AdminAnalytics, AppError> {
        let (repo, pool) = (&self.referral_repo, &self.pool);
        let referrals = with_linear_backoff(FETCH_ATTEMPTS, FETCH_BACKOFF, move || {
            repo.list_details(pool, None)
        })
        .await?;
        let total_users = self.user_repo.count(&self.pool).await?;

        let total_referrals = referrals.len() as i64;
        let approved_referrals = referrals
            .iter()
            .filter(|r| r.status == ReferralStatus::Aprovado)
            .count() as i64;

        Ok(AdminAnalytics {
            total_users,
            total_referrals,
            approved_referrals,
            conversion_rate: analytics::conversion_rate(total_referrals, approved_referrals),
            by_status: analytics::count_by_status(&referrals),
            by_unit: analytics::count_by_unit(&referrals),
            ranking: analytics::rank_referrers(&referrals, RANKING_LIMIT),
            monthly: analytics::monthly_series(&referrals, Utc::now(), MONTHS_IN_SERIES),
        })
    }
}
