use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::condition::PolicyCondition;

/// The effect a [`Policy`] produces when its conditions all hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "PascalCase")]
pub enum Effect {
    Permit,
    Deny,
}

impl std::fmt::Display for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Permit => write!(f, "Permit"),
            Effect::Deny => write!(f, "Deny"),
        }
    }
}

/// A named authorization rule: an effect, a priority (higher = stronger),
/// an active flag, and — loaded eagerly by the catalogue — its conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub effect: Effect,
    pub priority: i32,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub conditions: Vec<PolicyCondition>,
}

/// Raw row shape for `policies`, without the eagerly-joined conditions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PolicyRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub effect: Effect,
    pub priority: i32,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PolicyRow {
    pub fn into_policy(self, conditions: Vec<PolicyCondition>) -> Policy {
        Policy {
            id: self.id,
            name: self.name,
            description: self.description,
            effect: self.effect,
            priority: self.priority,
            is_active: self.is_active,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
            conditions,
        }
    }
}

/// Binds a [`Policy`] to an [`super::Action`] it applies to.
/// Unique per pair; a policy with zero live bindings never applies.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PolicyAction {
    pub id: Uuid,
    pub policy_id: Uuid,
    pub action_id: Uuid,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
