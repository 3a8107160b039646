use std::collections::HashMap;

use thiserror::Error;

use crate::domain::{AttributeType, AttributeValue, ConditionOperator, PolicyCondition};

/// The resolved value bag for one attribute category, keyed by attribute
/// key. A key is either present with a value, present but unparseable
/// against its schema (`Err` — surfaced as an `AttributeTypeError` for that
/// key), or simply absent — which the evaluator treats as "no value set",
/// distinct from both of the above.
#[derive(Debug, Clone, Default)]
pub struct AttributeBag(HashMap<String, Result<AttributeValue, String>>);

impl AttributeBag {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Records a successfully resolved value for `key`.
    pub fn insert(&mut self, key: String, value: AttributeValue) {
        self.0.insert(key, Ok(value));
    }

    /// Records that `key` has a stored value the store could not parse
    /// against its schema type.
    pub fn insert_unparseable(&mut self, key: String, reason: String) {
        self.0.insert(key, Err(reason));
    }

    pub fn get(&self, key: &str) -> Option<&Result<AttributeValue, String>> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Result<AttributeValue, String>)> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a AttributeBag {
    type Item = (&'a String, &'a Result<AttributeValue, String>);
    type IntoIter = std::collections::hash_map::Iter<'a, String, Result<AttributeValue, String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The three error kinds a condition can fail with. All are *data* errors,
/// not control-flow escapes — the policy evaluator turns them into
/// `Indeterminate`, never a panic or an `Err` that unwinds past this module.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    #[error("AttributeMissing: attribute '{0}' is missing")]
    AttributeMissing(String),
    #[error("AttributeTypeError: attribute type error: {0}")]
    AttributeTypeError(String),
    #[error("ConditionMalformed: condition malformed: {0}")]
    ConditionMalformed(String),
}

/// Evaluates a single condition against the resolved attribute bag for its
/// category. Pure function: no I/O, no clock reads.
pub fn evaluate_condition(
    condition: &PolicyCondition,
    bag: &AttributeBag,
) -> Result<bool, ConditionError> {
    let left = match bag.get(&condition.attribute_key) {
        None => return Err(ConditionError::AttributeMissing(condition.attribute_key.clone())),
        Some(Err(reason)) => return Err(ConditionError::AttributeTypeError(reason.clone())),
        Some(Ok(value)) => value,
    };

    let left_type = left.type_of();

    match condition.operator {
        ConditionOperator::Equals | ConditionOperator::NotEquals => {
            let right = parse_expected(left_type, &condition.expected_value)?;
            let eq = values_equal(left, &right)?;
            Ok(if condition.operator == ConditionOperator::Equals {
                eq
            } else {
                !eq
            })
        }
        ConditionOperator::GreaterThan
        | ConditionOperator::LessThan
        | ConditionOperator::GreaterThanOrEqual
        | ConditionOperator::LessThanOrEqual => {
            require_orderable(left_type)?;
            let right = parse_expected(left_type, &condition.expected_value)?;
            let ordering = compare(left, &right)?;
            Ok(match condition.operator {
                ConditionOperator::GreaterThan => ordering == std::cmp::Ordering::Greater,
                ConditionOperator::LessThan => ordering == std::cmp::Ordering::Less,
                ConditionOperator::GreaterThanOrEqual => ordering != std::cmp::Ordering::Less,
                ConditionOperator::LessThanOrEqual => ordering != std::cmp::Ordering::Greater,
                _ => unreachable!(),
            })
        }
        ConditionOperator::Contains => match left {
            AttributeValue::String(s) => Ok(s.contains(&condition.expected_value)),
            _ => Err(ConditionError::AttributeTypeError(
                "Contains requires a String attribute".to_string(),
            )),
        },
        ConditionOperator::In | ConditionOperator::NotIn => {
            let members = split_list(&condition.expected_value);
            let mut any_match = false;
            for raw in &members {
                let candidate = left_type.parse(raw).map_err(ConditionError::AttributeTypeError)?;
                if values_equal(left, &candidate)? {
                    any_match = true;
                    break;
                }
            }
            Ok(if condition.operator == ConditionOperator::In {
                any_match
            } else {
                !any_match
            })
        }
    }
}

/// `In`/`NotIn` expected values are comma-separated, trimmed, with empty
/// elements ignored.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_expected(left_type: AttributeType, raw: &str) -> Result<AttributeValue, ConditionError> {
    left_type.parse(raw).map_err(ConditionError::AttributeTypeError)
}

fn require_orderable(t: AttributeType) -> Result<(), ConditionError> {
    match t {
        AttributeType::Number | AttributeType::DateTime => Ok(()),
        _ => Err(ConditionError::AttributeTypeError(format!(
            "ordering is not defined for {t}"
        ))),
    }
}

fn values_equal(a: &AttributeValue, b: &AttributeValue) -> Result<bool, ConditionError> {
    match (a, b) {
        (AttributeValue::String(x), AttributeValue::String(y)) => Ok(x == y),
        (AttributeValue::Number(x), AttributeValue::Number(y)) => {
            if x.is_nan() || y.is_nan() {
                return Err(ConditionError::AttributeTypeError(
                    "NaN is not comparable".to_string(),
                ));
            }
            Ok(x == y)
        }
        (AttributeValue::Boolean(x), AttributeValue::Boolean(y)) => Ok(x == y),
        (AttributeValue::DateTime(x), AttributeValue::DateTime(y)) => Ok(x == y),
        _ => Err(ConditionError::AttributeTypeError(
            "operand types do not match".to_string(),
        )),
    }
}

fn compare(a: &AttributeValue, b: &AttributeValue) -> Result<std::cmp::Ordering, ConditionError> {
    match (a, b) {
        (AttributeValue::Number(x), AttributeValue::Number(y)) => {
            if x.is_nan() || y.is_nan() {
                return Err(ConditionError::AttributeTypeError(
                    "NaN is not comparable".to_string(),
                ));
            }
            x.partial_cmp(y)
                .ok_or_else(|| ConditionError::AttributeTypeError("incomparable Number".to_string()))
        }
        (AttributeValue::DateTime(x), AttributeValue::DateTime(y)) => Ok(x.cmp(y)),
        _ => Err(ConditionError::AttributeTypeError(
            "ordering requires matching Number or DateTime operands".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn cond(category: crate::domain::AttributeCategory, key: &str, op: ConditionOperator, expected: &str) -> PolicyCondition {
        PolicyCondition {
            id: Uuid::new_v4(),
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
    fn missing_attribute_is_an_error() {
        let bag = AttributeBag::new();
        let c = cond(crate::domain::AttributeCategory::Subject, "department", ConditionOperator::Equals, "IT");
        assert_eq!(
            evaluate_condition(&c, &bag),
            Err(ConditionError::AttributeMissing("department".to_string()))
        );
    }

    #[test]
    fn unparseable_stored_value_is_a_type_error() {
        let mut bag = AttributeBag::new();
        bag.insert_unparseable("level".to_string(), "'abc' is not a valid Number".to_string());
        let c = cond(crate::domain::AttributeCategory::Subject, "level", ConditionOperator::GreaterThan, "3");
        assert!(matches!(evaluate_condition(&c, &bag), Err(ConditionError::AttributeTypeError(_))));
    }

    #[test]
    fn equals_case_sensitive() {
        let mut bag = AttributeBag::new();
        bag.insert("department".to_string(), AttributeValue::String("IT".to_string()));
        let c = cond(crate::domain::AttributeCategory::Subject, "department", ConditionOperator::Equals, "it");
        assert_eq!(evaluate_condition(&c, &bag), Ok(false));
    }

    #[test]
    fn greater_than_on_boolean_is_type_error() {
        let mut bag = AttributeBag::new();
        bag.insert("flag".to_string(), AttributeValue::Boolean(true));
        let c = cond(crate::domain::AttributeCategory::Subject, "flag", ConditionOperator::GreaterThan, "true");
        assert!(matches!(evaluate_condition(&c, &bag), Err(ConditionError::AttributeTypeError(_))));
    }

    #[test]
    fn in_with_empty_expected_value_is_always_false() {
        let mut bag = AttributeBag::new();
        bag.insert("department".to_string(), AttributeValue::String("IT".to_string()));
        let c = cond(crate::domain::AttributeCategory::Subject, "department", ConditionOperator::In, "");
        assert_eq!(evaluate_condition(&c, &bag), Ok(false));
    }

    #[test]
    fn in_trims_whitespace_around_elements() {
        let mut bag = AttributeBag::new();
        bag.insert("department".to_string(), AttributeValue::String("IT".to_string()));
        let c = cond(crate::domain::AttributeCategory::Subject, "department", ConditionOperator::In, " HR , IT ");
        assert_eq!(evaluate_condition(&c, &bag), Ok(true));
    }

    #[test]
    fn contains_is_case_sensitive_substring() {
        let mut bag = AttributeBag::new();
        bag.insert("path".to_string(), AttributeValue::String("/api/v1/reports".to_string()));
        let c = cond(crate::domain::AttributeCategory::Environment, "path", ConditionOperator::Contains, "reports");
        assert_eq!(evaluate_condition(&c, &bag), Ok(true));
    }

    #[test]
    fn datetime_ordering_at_instant_precision() {
        let mut bag = AttributeBag::new();
        bag.insert(
            "joined".to_string(),
            AttributeValue::DateTime(Utc::now() - chrono::Duration::days(1)),
        );
        let c = cond(
            crate::domain::AttributeCategory::Subject,
            "joined",
            ConditionOperator::LessThan,
            &Utc::now().to_rfc3339(),
        );
        assert_eq!(evaluate_condition(&c, &bag), Ok(true));
    }
}
