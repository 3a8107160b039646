use uuid::Uuid;

use crate::domain::Effect;

use super::policy::{PolicyEvaluation, PolicyOutcome};

/// The final decision + explanation produced by the combining algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct CombinedDecision {
    pub decision: Effect,
    pub reason: String,
    pub deciding_policy_id: Option<Uuid>,
}

/// Deny-overrides with priority and an explicit NotApplicable default.
///
/// `evaluations` MUST already be in `(priority DESC, id ASC)` order — the
/// same order [`crate::features::policies::catalogue`] returns. A Deny at
/// any priority overrides every Permit; priority only decides which Deny
/// (or, absent a Deny, which Permit) is attributed in the log.
pub fn combine(evaluations: &[PolicyEvaluation]) -> CombinedDecision {
    let mut latched_permit: Option<Uuid> = None;
    let mut first_indeterminate: Option<(Uuid, String)> = None;

    for eval in evaluations {
        match &eval.outcome {
            PolicyOutcome::Applies(Effect::Deny) => {
                return CombinedDecision {
                    decision: Effect::Deny,
                    reason: format!("Denied by policy {}", eval.policy_id),
                    deciding_policy_id: Some(eval.policy_id),
                };
            }
            PolicyOutcome::Applies(Effect::Permit) => {
                if latched_permit.is_none() {
                    latched_permit = Some(eval.policy_id);
                }
            }
            PolicyOutcome::Indeterminate(err) => {
                if first_indeterminate.is_none() {
                    first_indeterminate = Some((eval.policy_id, err.to_string()));
                }
            }
            PolicyOutcome::NotApplicable => {}
        }
    }

    if let Some(policy_id) = latched_permit {
        return CombinedDecision {
            decision: Effect::Permit,
            reason: format!("Permitted by policy {policy_id}"),
            deciding_policy_id: Some(policy_id),
        };
    }

    if let Some((policy_id, err)) = first_indeterminate {
        return CombinedDecision {
            decision: Effect::Deny,
            reason: format!("Indeterminate policy(ies): {err}"),
            deciding_policy_id: Some(policy_id),
        };
    }

    CombinedDecision {
        decision: Effect::Deny,
        reason: "No applicable policy".to_string(),
        deciding_policy_id: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::evaluation::condition::ConditionError;

    fn eval(id: Uuid, outcome: PolicyOutcome) -> PolicyEvaluation {
        PolicyEvaluation { policy_id: id, outcome }
    }

    #[test]
    fn no_policies_denies_with_no_applicable_reason() {
        let result = combine(&[]);
        assert_eq!(result.decision, Effect::Deny);
        assert_eq!(result.reason, "No applicable policy");
        assert_eq!(result.deciding_policy_id, None);
    }

    #[test]
    fn deny_overrides_permit_regardless_of_order() {
        let permit_id = Uuid::new_v4();
        let deny_id = Uuid::new_v4();
        // Permit listed first (higher priority) but Deny still wins.
        let result = combine(&[
            eval(permit_id, PolicyOutcome::Applies(Effect::Permit)),
            eval(deny_id, PolicyOutcome::Applies(Effect::Deny)),
        ]);
        assert_eq!(result.decision, Effect::Deny);
        assert_eq!(result.deciding_policy_id, Some(deny_id));
    }

    #[test]
    fn indeterminate_with_no_permit_fails_closed() {
        let id = Uuid::new_v4();
        let result = combine(&[eval(
            id,
            PolicyOutcome::Indeterminate(ConditionError::AttributeMissing("level".to_string())),
        )]);
        assert_eq!(result.decision, Effect::Deny);
        assert_eq!(result.deciding_policy_id, Some(id));
        assert!(result.reason.contains("Indeterminate"));
    }

    #[test]
    fn latched_permit_wins_over_indeterminate() {
        let indet_id = Uuid::new_v4();
        let permit_id = Uuid::new_v4();
        let result = combine(&[
            eval(
                indet_id,
                PolicyOutcome::Indeterminate(ConditionError::AttributeMissing("x".to_string())),
            ),
            eval(permit_id, PolicyOutcome::Applies(Effect::Permit)),
        ]);
        assert_eq!(result.decision, Effect::Permit);
        assert_eq!(result.deciding_policy_id, Some(permit_id));
    }

    #[test]
    fn first_permit_is_latched_when_several_apply() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let result = combine(&[
            eval(first, PolicyOutcome::Applies(Effect::Permit)),
            eval(second, PolicyOutcome::Applies(Effect::Permit)),
        ]);
        assert_eq!(result.deciding_policy_id, Some(first));
    }
}
