use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An operation a [`crate::domain::Policy`] can be bound to (e.g. `read`,
/// `write`). `code` is unique and matches the same snake_case pattern as
/// attribute schema keys.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Action {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
