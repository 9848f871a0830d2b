// src/services/referral_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{user_repo::NewUser, ActivityRepository, ReferralRepository, UnitRepository, UserRepository},
    models::{
        activity::{ACTION_REFERRAL_CREATED, ACTION_STATUS_CHANGED},
        auth::{User, UserRole},
        pagination::Page,
        referral::{
            CreateReferralPayload, Referral, ReferralDetail, ReferralFilter, StatusOption,
            UpdateStatusPayload,
        },
    },
    services::{
        auth::generate_referral_code,
        notification_service::{NotificationService, PushNotification},
        referral_workflow::{plan_transition, selectable_statuses, ApprovedDelta},
    },
};

/// Clientes só enxergam as próprias indicações; a equipe enxerga todas.
pub fn visibility_scope(user: &User) -> Option<Uuid> {
    if user.role.is_staff() { None } else { Some(user.id) }
}

#[derive(Clone)]
pub struct ReferralService {
    repo: ReferralRepository,
    user_repo: UserRepository,
    unit_repo: UnitRepository,
    activity_repo: ActivityRepository,
    notifications: NotificationService,
    pool: PgPool,
}

impl ReferralService {
    pub fn new(
        repo: ReferralRepository,
        user_repo: UserRepository,
        unit_repo: UnitRepository,
        activity_repo: ActivityRepository,
        notifications: NotificationService,
    ) -> Self {
        let pool = repo.pool().clone();
        Self { repo, user_repo, unit_repo, activity_repo, notifications, pool }
    }

    // =========================================================================
    //  1. CRIAÇÃO (formulário de indicação)
    // =========================================================================

    pub async fn create_referral(
        &self,
        actor: &User,
        payload: &CreateReferralPayload,
    ) -> Result<Referral, AppError> {
        if payload.email.trim().eq_ignore_ascii_case(actor.email.trim()) {
            return Err(AppError::SelfReferral);
        }
        if let Some(unit_id) = payload.unit_id {
            if !self.unit_repo.exists(unit_id).await? {
                return Err(AppError::UnitNotFound);
            }
        }
        let unit_id = payload.unit_id.or(actor.unit_id);

        let mut tx = self.pool.begin().await?;

        // O indicado vira um usuário Cliente sem senha, se ainda não existir
        let existing = self.user_repo.find_by_email(&mut *tx, &payload.email).await?;
        let referred = match existing {
            Some(user) => user,
            None => {
                let referral_code = generate_referral_code();
                self.user_repo
                    .create_user(
                        &mut *tx,
                        NewUser {
                            email: payload.email.trim(),
                            password_hash: None,
                            full_name: payload.full_name.trim(),
                            phone: payload.phone.as_deref(),
                            role: UserRole::Cliente,
                            unit_id,
                            referral_code: &referral_code,
                            referred_by: Some(actor.id),
                            is_resolve_customer: false,
                        },
                    )
                    .await?
            }
        };

        if referred.id == actor.id {
            return Err(AppError::SelfReferral);
        }
        if self.repo.exists_for_referred(&mut *tx, referred.id).await? {
            return Err(AppError::AlreadyReferred);
        }

        let referral = self.repo.create(&mut *tx, actor.id, referred.id, unit_id).await?;
        self.user_repo.increment_total_referrals(&mut *tx, actor.id).await?;
        self.activity_repo
            .log(
                &mut *tx,
                actor.id,
                ACTION_REFERRAL_CREATED,
                json!({ "referralId": referral.id, "referredId": referred.id, "via": "form" }),
            )
            .await?;

        tx.commit().await?;
        tracing::info!("📨 Nova indicação {} por {}", referral.id, actor.id);

        Ok(referral)
    }

    // =========================================================================
    //  2. CONSULTA
    // =========================================================================

    /// Linhas visíveis para o usuário, já filtradas (sem paginação).
    pub async fn filtered(&self, actor: &User, filter: &ReferralFilter) -> Result<Vec<ReferralDetail>, AppError> {
        let rows = self.repo.list_details(&self.pool, visibility_scope(actor)).await?;
        Ok(filter.apply(rows))
    }

    pub async fn list(&self, actor: &User, filter: &ReferralFilter) -> Result<Page<ReferralDetail>, AppError> {
        let rows = self.filtered(actor, filter).await?;
        Ok(Page::paginate(rows, filter.page, filter.per_page))
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<ReferralDetail, AppError> {
        let detail = self
            .repo
            .find_detail(&self.pool, id)
            .await?
            .ok_or(AppError::ReferralNotFound)?;

        // Indicação de outra pessoa responde como inexistente
        match visibility_scope(actor) {
            Some(owner) if owner != detail.referrer_id => Err(AppError::ReferralNotFound),
            _ => Ok(detail),
        }
    }

    pub async fn status_options(&self, actor: &User, id: Uuid) -> Result<Vec<StatusOption>, AppError> {
        let detail = self.get(actor, id).await?;
        Ok(selectable_statuses(actor.role, detail.status)
            .into_iter()
            .map(|status| status.presentation())
            .collect())
    }

    // =========================================================================
    //  3. TRANSIÇÃO DE STATUS
    // =========================================================================

    pub async fn update_status(
        &self,
        actor: &User,
        id: Uuid,
        payload: &UpdateStatusPayload,
    ) -> Result<Referral, AppError> {
        let mut tx = self.pool.begin().await?;

        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::ReferralNotFound)?;

        // Regra inválida: sai antes de qualquer escrita (rollback no drop)
        let plan = plan_transition(
            actor.role,
            current.status,
            payload.status,
            payload.rejection_reason.as_deref(),
        )?;

        let updated = self
            .repo
            .update_status(&mut *tx, id, plan.target, plan.rejection_reason.as_deref())
            .await?;

        if plan.approved_delta != ApprovedDelta::Unchanged {
            let approved = self
                .user_repo
                .adjust_approved_referrals(&mut *tx, current.referrer_id, plan.approved_delta.as_i32())
                .await?;
            tracing::debug!("Aprovadas de {}: {}", current.referrer_id, approved);
        }

        self.activity_repo
            .log(
                &mut *tx,
                actor.id,
                ACTION_STATUS_CHANGED,
                json!({
                    "referralId": id,
                    "from": current.status,
                    "to": plan.target,
                    "rejectionReason": plan.rejection_reason,
                }),
            )
            .await?;

        let detail = self.repo.find_detail(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::info!("🔄 Indicação {}: {} -> {} (por {})", id, current.status, plan.target, actor.id);

        if let Some(detail) = detail {
            self.notifications
                .notify(PushNotification::status_changed(
                    detail.referrer_id,
                    detail.id,
                    &detail.referred_name,
                    plan.target,
                ))
                .await;
        }

        Ok(updated)
    }

    // =========================================================================
    //  4. EXPORTAÇÃO
    // =========================================================================

    pub async fn export_rows(&self, actor: &User, filter: &ReferralFilter) -> Result<Vec<ReferralDetail>, AppError> {
        if !actor.role.is_staff() {
            return Err(AppError::Forbidden);
        }
        self.filtered(actor, filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::sample_user;

    #[test]
    fn clients_are_scoped_to_their_own_referrals() {
        let client = sample_user(UserRole::Cliente);
        assert_eq!(visibility_scope(&client), Some(client.id));
        let seller = sample_user(UserRole::Vendedor);
        assert_eq!(visibility_scope(&seller), Some(seller.id));
    }

    #[test]
    fn staff_sees_everything() {
        for role in [UserRole::Sdr, UserRole::Contratos, UserRole::Admin, UserRole::SuperAdmin] {
            assert_eq!(visibility_scope(&sample_user(role)), None);
        }
    }
}
