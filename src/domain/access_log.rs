use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The outcome recorded for one evaluation. Distinct from
/// [`super::policy::Effect`]: `Error` and `NotApplicable` have no
/// corresponding policy effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "PascalCase")]
pub enum DecisionResult {
    Permit,
    Deny,
    Error,
    NotApplicable,
}

impl std::fmt::Display for DecisionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One immutable audit record per decision. Never mutated after insert;
/// `policy_id` is nulled (not cascaded) when the deciding policy is later
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AccessLog {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub subject_id: Uuid,
    pub resource_id: Option<Uuid>,
    pub action_id: Option<Uuid>,
    pub policy_id: Option<Uuid>,
    pub result: DecisionResult,
    pub reason: Option<String>,
    pub context_json: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub is_deleted: bool,
}
