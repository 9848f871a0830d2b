// src/services/reward_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ActivityRepository, ReferralRepository, RewardRepository, SettingsRepository, UserRepository},
    models::{
        activity::ACTION_REWARD_GRANTED,
        auth::User,
        referral::{Referral, ReferralStatus},
        reward::{GrantRewardPayload, Reward},
    },
};

pub fn ensure_non_negative(field: &'static str, amount: Decimal) -> Result<Decimal, AppError> {
    if amount.is_sign_negative() {
        let mut errors = validator::ValidationErrors::new();
        errors.add(field, validator::ValidationError::new("negative_amount"));
        return Err(AppError::ValidationError(errors));
    }
    Ok(amount)
}

/// Recompensa vinculada a uma indicação só vale para quem indicou, e depois de aprovada.
pub fn ensure_reward_referral(user_id: Uuid, referral: &Referral) -> Result<(), AppError> {
    if referral.referrer_id != user_id || referral.status != ReferralStatus::Aprovado {
        return Err(AppError::RewardNotEligible);
    }
    Ok(())
}

/// Valor explícito ganha do padrão; valor negativo é recusado.
pub fn resolve_amount(requested: Option<Decimal>, default_amount: Decimal) -> Result<Decimal, AppError> {
    ensure_non_negative("amount", requested.unwrap_or(default_amount))
}

#[derive(Clone)]
pub struct RewardService {
    repo: RewardRepository,
    user_repo: UserRepository,
    referral_repo: ReferralRepository,
    settings_repo: SettingsRepository,
    activity_repo: ActivityRepository,
    pool: PgPool,
}

impl RewardService {
    pub fn new(
        repo: RewardRepository,
        user_repo: UserRepository,
        referral_repo: ReferralRepository,
        settings_repo: SettingsRepository,
        activity_repo: ActivityRepository,
        pool: PgPool,
    ) -> Self {
        Self { repo, user_repo, referral_repo, settings_repo, activity_repo, pool }
    }

    pub async fn grant(&self, actor: &User, payload: &GrantRewardPayload) -> Result<Reward, AppError> {
        self.user_repo
            .find_by_id(payload.user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let settings = self.settings_repo.get_settings().await?;
        let amount = resolve_amount(payload.amount, settings.reward_per_approval)?;

        let mut tx = self.pool.begin().await?;

        if let Some(referral_id) = payload.referral_id {
            let referral = self
                .referral_repo
                .find_for_update(&mut *tx, referral_id)
                .await?
                .ok_or(AppError::ReferralNotFound)?;
            ensure_reward_referral(payload.user_id, &referral)?;
        }

        let reward = self
            .repo
            .create(
                &mut *tx,
                payload.user_id,
                payload.referral_id,
                amount,
                payload.description.as_deref(),
            )
            .await?;
        self.activity_repo
            .log(
                &mut *tx,
                actor.id,
                ACTION_REWARD_GRANTED,
                json!({ "rewardId": reward.id, "userId": payload.user_id, "amount": amount }),
            )
            .await?;
        tx.commit().await?;

        Ok(reward)
    }

    pub async fn list_for(&self, user_id: Option<Uuid>) -> Result<Vec<Reward>, AppError> {
        self.repo.list(user_id).await
    }

    pub async fn mark_paid(&self, id: Uuid) -> Result<Reward, AppError> {
        self.repo.mark_paid(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::referral::sample_referral;
    use std::str::FromStr;

    #[test]
    fn reward_referral_must_be_approved_and_belong_to_the_user() {
        let referrer = Uuid::new_v4();
        assert!(ensure_reward_referral(referrer, &sample_referral(referrer, ReferralStatus::Aprovado)).is_ok());

        let someone_else = Uuid::new_v4();
        assert!(matches!(
            ensure_reward_referral(someone_else, &sample_referral(referrer, ReferralStatus::Aprovado)),
            Err(AppError::RewardNotEligible)
        ));
        for status in [ReferralStatus::Indicacao, ReferralStatus::EmNegociacao, ReferralStatus::SemInteresse] {
            assert!(matches!(
                ensure_reward_referral(referrer, &sample_referral(referrer, status)),
                Err(AppError::RewardNotEligible)
            ));
        }
    }

    #[test]
    fn explicit_amount_overrides_default() {
        let default = Decimal::from_str("150.00").unwrap();
        let explicit = Decimal::from_str("80.50").unwrap();
        assert_eq!(resolve_amount(Some(explicit), default).unwrap(), explicit);
        assert_eq!(resolve_amount(None, default).unwrap(), default);
    }

    #[test]
    fn negative_amount_is_a_validation_error() {
        let err = resolve_amount(Some(Decimal::from_str("-1").unwrap()), Decimal::ZERO).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
