use uuid::Uuid;

use crate::domain::{Effect, Policy};

use super::condition::{evaluate_condition, AttributeBag, ConditionError};

/// The outcome of evaluating one policy against a request.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutcome {
    Applies(Effect),
    NotApplicable,
    Indeterminate(ConditionError),
}

/// Evaluates all conditions of one policy under AND semantics.
///
/// Conditions are walked in `id ASC` order (the catalogue is expected to
/// hand them back pre-sorted; this function does not re-sort, so ordering
/// is the caller's responsibility — see
/// [`crate::features::policies::catalogue`]).
///
/// Short-circuits on the first `false` (→ `NotApplicable`) and on the first
/// error (→ `Indeterminate`); a false at position *k* outranks an error at
/// position *k+1* — errors must never elevate above a clean negative.
///
/// A policy with zero conditions is `NotApplicable` by construction: an
/// unconditioned Permit would defeat the purpose of ABAC.
pub fn evaluate_policy(
    policy: &Policy,
    subject_attrs: &AttributeBag,
    resource_attrs: &AttributeBag,
    environment_attrs: &AttributeBag,
) -> PolicyOutcome {
    if policy.conditions.is_empty() {
        return PolicyOutcome::NotApplicable;
    }

    for condition in &policy.conditions {
        let bag = match condition.attribute_category {
            crate::domain::AttributeCategory::Subject => subject_attrs,
            crate::domain::AttributeCategory::Resource => resource_attrs,
            crate::domain::AttributeCategory::Environment => environment_attrs,
        };

        match evaluate_condition(condition, bag) {
            Ok(true) => continue,
            Ok(false) => return PolicyOutcome::NotApplicable,
            Err(e) => return PolicyOutcome::Indeterminate(e),
        }
    }

    PolicyOutcome::Applies(policy.effect)
}

/// Pairs a policy id with its outcome — the unit C6 consumes.
#[derive(Debug, Clone)]
pub struct PolicyEvaluation {
    pub policy_id: Uuid,
    pub outcome: PolicyOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttributeCategory, AttributeValue, ConditionOperator, PolicyCondition};
    use chrono::Utc;

    fn policy_with_conditions(effect: Effect, conditions: Vec<PolicyCondition>) -> Policy {
        Policy {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            description: None,
            effect,
            priority: 0,
            is_active: true,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            conditions,
        }
    }

    fn cond(id_seed: u8, category: AttributeCategory, key: &str, op: ConditionOperator, expected: &str) -> PolicyCondition {
        let mut bytes = [0u8; 16];
        bytes[15] = id_seed;
        PolicyCondition {
            id: Uuid::from_bytes(bytes),
            policy_id: Uuid::new_v4(),
            attribute_category: category,
            attribute_key: key.to_string(),
            operator: op,
            expected_value: expected.to_string(),
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn zero_conditions_is_not_applicable() {
        let p = policy_with_conditions(Effect::Permit, vec![]);
        let empty = AttributeBag::new();
        assert_eq!(
            evaluate_policy(&p, &empty, &empty, &empty),
            PolicyOutcome::NotApplicable
        );
    }

    #[test]
    fn false_before_error_yields_not_applicable_not_indeterminate() {
        let p = policy_with_conditions(
            Effect::Permit,
            vec![
                cond(1, AttributeCategory::Subject, "department", ConditionOperator::Equals, "HR"),
                cond(2, AttributeCategory::Subject, "missing_attr", ConditionOperator::Equals, "x"),
            ],
        );
        let mut subject = AttributeBag::new();
        subject.insert("department".to_string(), AttributeValue::String("IT".to_string()));
        let empty = AttributeBag::new();
        assert_eq!(
            evaluate_policy(&p, &subject, &empty, &empty),
            PolicyOutcome::NotApplicable
        );
    }

    #[test]
    fn all_true_applies_effect() {
        let p = policy_with_conditions(
            Effect::Permit,
            vec![cond(1, AttributeCategory::Subject, "department", ConditionOperator::Equals, "IT")],
        );
        let mut subject = AttributeBag::new();
        subject.insert("department".to_string(), AttributeValue::String("IT".to_string()));
        let empty = AttributeBag::new();
        assert_eq!(
            evaluate_policy(&p, &subject, &empty, &empty),
            PolicyOutcome::Applies(Effect::Permit)
        );
    }
}
