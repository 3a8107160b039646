use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{AttributeCategory, ConditionOperator, Effect};

#[derive(Debug, Deserialize)]
pub struct CreateConditionInput {
    pub attribute_category: AttributeCategory,
    pub attribute_key: String,
    pub operator: ConditionOperator,
    pub expected_value: String,
}

#[derive(Debug, Deserialize)]
pub struct CreatePolicyInput {
    pub name: String,
    pub description: Option<String>,
    pub effect: Effect,
    pub priority: i32,
    pub is_active: Option<bool>,
    pub action_ids: Vec<Uuid>,
    pub conditions: Vec<CreateConditionInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePolicyInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub effect: Option<Effect>,
    pub priority: Option<i32>,
    pub is_active: Option<bool>,
}
