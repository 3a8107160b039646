use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A subject access is requested on behalf of. Opaque beyond `id`/`is_deleted` —
/// everything else about it is carried as [`super::SubjectAttribute`] rows.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subject {
    pub id: Uuid,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}
