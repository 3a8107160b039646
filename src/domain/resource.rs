use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A resource access is checked against. Opaque beyond `id`/`is_deleted` —
/// everything else about it is carried as [`super::ResourceAttribute`]
/// rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
