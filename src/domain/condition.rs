use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attribute::AttributeCategory;

/// The fixed operator set of the condition grammar. No nested boolean
/// expressions, no user-defined functions: richer logic is expressed as
/// multiple policies composing under the combining algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "PascalCase")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Contains,
    In,
    NotIn,
}

impl std::fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One typed comparison of a resolved attribute against a constant.
/// `expected_value` is a string, parsed per the left operand's type at
/// evaluation time.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PolicyCondition {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub attribute_category: AttributeCategory,
    pub attribute_key: String,
    pub operator: ConditionOperator,
    pub expected_value: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
