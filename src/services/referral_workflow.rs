// src/services/referral_workflow.rs
//
// Regras do funil de indicações: quais cargos movem para quais estágios e
// o que cada transição escreve no banco. Tudo aqui é puro; a persistência
// fica no ReferralService.

use crate::{
    common::error::AppError,
    models::{auth::UserRole, referral::ReferralStatus},
};

use ReferralStatus::*;

const SDR_STATUSES: &[ReferralStatus] = &[ContatoComercial, EmNegociacao, SemInteresse];
const CONTRACTS_STATUSES: &[ReferralStatus] = &[SemInteresse, Aprovado];
const ADMIN_STATUSES: &[ReferralStatus] = &ReferralStatus::ALL;

/// Estágios para os quais o cargo pode mover uma indicação.
pub fn allowed_status_for_user(role: UserRole) -> &'static [ReferralStatus] {
    match role {
        UserRole::Sdr => SDR_STATUSES,
        UserRole::Contratos => CONTRACTS_STATUSES,
        UserRole::Admin | UserRole::SuperAdmin => ADMIN_STATUSES,
        UserRole::Cliente | UserRole::Vendedor => &[],
    }
}

pub fn can_approve_referrals(role: UserRole) -> bool {
    allowed_status_for_user(role).contains(&Aprovado)
}

/// Opções oferecidas na tela: permitidas para o cargo, menos o estágio atual.
pub fn selectable_statuses(role: UserRole, current: ReferralStatus) -> Vec<ReferralStatus> {
    allowed_status_for_user(role)
        .iter()
        .copied()
        .filter(|status| *status != current)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovedDelta {
    Increment,
    Decrement,
    Unchanged,
}

impl ApprovedDelta {
    pub fn between(current: ReferralStatus, target: ReferralStatus) -> Self {
        match (current == Aprovado, target == Aprovado) {
            (false, true) => ApprovedDelta::Increment,
            (true, false) => ApprovedDelta::Decrement,
            _ => ApprovedDelta::Unchanged,
        }
    }

    pub fn as_i32(self) -> i32 {
        match self {
            ApprovedDelta::Increment => 1,
            ApprovedDelta::Decrement => -1,
            ApprovedDelta::Unchanged => 0,
        }
    }

    /// Aplica ao contador, sem passar de zero para baixo.
    pub fn apply(self, approved: i32) -> i32 {
        (approved + self.as_i32()).max(0)
    }
}

/// O que uma transição válida vai gravar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    pub target: ReferralStatus,
    /// Preenchido somente quando o alvo é o estágio de reprovação
    pub rejection_reason: Option<String>,
    pub approved_delta: ApprovedDelta,
}

/// Valida a transição antes de qualquer escrita.
pub fn plan_transition(
    role: UserRole,
    current: ReferralStatus,
    target: ReferralStatus,
    reason: Option<&str>,
) -> Result<TransitionPlan, AppError> {
    if !allowed_status_for_user(role).contains(&target) {
        return Err(AppError::StatusNotAllowed { role, status: target });
    }
    if target == current {
        return Err(AppError::StatusUnchanged(current));
    }

    let rejection_reason = if target.is_rejection() {
        let reason = reason.map(str::trim).unwrap_or_default();
        if reason.is_empty() {
            return Err(AppError::RejectionReasonRequired);
        }
        Some(reason.to_string())
    } else {
        None
    };

    Ok(TransitionPlan {
        target,
        rejection_reason,
        approved_delta: ApprovedDelta::between(current, target),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn allowed_table_per_role() {
        assert_eq!(
            allowed_status_for_user(UserRole::Sdr),
            &[ContatoComercial, EmNegociacao, SemInteresse]
        );
        assert_eq!(allowed_status_for_user(UserRole::Contratos), &[SemInteresse, Aprovado]);
        assert_eq!(allowed_status_for_user(UserRole::Admin), &ReferralStatus::ALL);
        assert_eq!(allowed_status_for_user(UserRole::SuperAdmin), &ReferralStatus::ALL);
        assert!(allowed_status_for_user(UserRole::Cliente).is_empty());
        assert!(allowed_status_for_user(UserRole::Vendedor).is_empty());
    }

    #[test]
    fn only_contracts_and_admins_approve() {
        let approvers: Vec<_> = UserRole::ALL
            .into_iter()
            .filter(|role| can_approve_referrals(*role))
            .collect();
        assert_eq!(approvers, vec![UserRole::Contratos, UserRole::Admin, UserRole::SuperAdmin]);
    }

    #[test]
    fn selectable_options_are_allowed_minus_current_for_every_role() {
        for role in UserRole::ALL {
            for current in ReferralStatus::ALL {
                let offered: HashSet<_> = selectable_statuses(role, current).into_iter().collect();
                let expected: HashSet<_> = allowed_status_for_user(role)
                    .iter()
                    .copied()
                    .filter(|s| *s != current)
                    .collect();
                assert_eq!(offered, expected, "{role} em {current}");
                assert!(!offered.contains(&current));
            }
        }
    }

    #[test]
    fn every_offered_option_is_a_valid_transition() {
        for role in UserRole::ALL {
            for current in ReferralStatus::ALL {
                for target in selectable_statuses(role, current) {
                    let plan = plan_transition(role, current, target, Some("motivo"));
                    assert!(plan.is_ok(), "{role}: {current} -> {target}");
                }
            }
        }
    }

    #[test]
    fn role_outside_table_is_forbidden() {
        let err = plan_transition(UserRole::Sdr, EmNegociacao, Aprovado, None).unwrap_err();
        assert!(matches!(
            err,
            AppError::StatusNotAllowed { role: UserRole::Sdr, status: Aprovado }
        ));

        let err = plan_transition(UserRole::Cliente, Indicacao, ContatoComercial, None).unwrap_err();
        assert!(matches!(err, AppError::StatusNotAllowed { .. }));
    }

    #[test]
    fn no_op_transition_is_rejected() {
        let err = plan_transition(UserRole::Admin, Aprovado, Aprovado, None).unwrap_err();
        assert!(matches!(err, AppError::StatusUnchanged(Aprovado)));
    }

    #[test]
    fn rejection_requires_a_non_blank_reason() {
        for reason in [None, Some(""), Some("   ")] {
            let err = plan_transition(UserRole::Sdr, EmNegociacao, SemInteresse, reason).unwrap_err();
            assert!(matches!(err, AppError::RejectionReasonRequired));
        }

        let plan =
            plan_transition(UserRole::Sdr, EmNegociacao, SemInteresse, Some("  sem orçamento ")).unwrap();
        assert_eq!(plan.rejection_reason.as_deref(), Some("sem orçamento"));
    }

    #[test]
    fn reason_is_dropped_outside_the_rejection_stage() {
        let plan =
            plan_transition(UserRole::Admin, SemInteresse, EmNegociacao, Some("antigo motivo")).unwrap();
        assert_eq!(plan.rejection_reason, None);
        assert_eq!(plan.approved_delta, ApprovedDelta::Unchanged);
    }

    #[test]
    fn approved_delta_follows_entering_and_leaving_approval() {
        assert_eq!(ApprovedDelta::between(EmNegociacao, Aprovado), ApprovedDelta::Increment);
        assert_eq!(ApprovedDelta::between(Aprovado, SemInteresse), ApprovedDelta::Decrement);
        assert_eq!(ApprovedDelta::between(Aprovado, Indicacao), ApprovedDelta::Decrement);
        assert_eq!(ApprovedDelta::between(Indicacao, ContatoComercial), ApprovedDelta::Unchanged);
    }

    #[test]
    fn approval_round_trip_restores_counter() {
        let mut approved = 2;

        let approve = plan_transition(UserRole::Contratos, EmNegociacao, Aprovado, None).unwrap();
        approved = approve.approved_delta.apply(approved);
        assert_eq!(approved, 3);

        let reject = plan_transition(
            UserRole::Contratos,
            Aprovado,
            SemInteresse,
            Some("cliente desistiu"),
        )
        .unwrap();
        assert_eq!(reject.rejection_reason.as_deref(), Some("cliente desistiu"));
        approved = reject.approved_delta.apply(approved);
        assert_eq!(approved, 2);
    }

    #[test]
    fn counter_never_goes_below_zero() {
        assert_eq!(ApprovedDelta::Decrement.apply(0), 0);
        assert_eq!(ApprovedDelta::Decrement.apply(1), 0);
        assert_eq!(ApprovedDelta::Unchanged.apply(0), 0);
    }
}
