use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A value bound to a resource for a given attribute. No temporal validity;
/// at most one live row per `(resource_id, attribute_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ResourceAttribute {
    pub id: Uuid,
    pub resource_id: Uuid,
    pub attribute_id: Uuid,
    pub value: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
