use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attribute::AttributeType;

/// A named, typed attribute key subjects/resources can carry values for.
/// `key` is unique across live schemas and matches `^[a-z_][a-z0-9_]*$`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttributeSchema {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    #[sqlx(rename = "attribute_type")]
    pub r#type: AttributeType,
    pub description: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `key` must match this pattern everywhere it is accepted.
pub const KEY_PATTERN: &str = r"^[a-z_][a-z0-9_]*$";
