use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Input for binding a value to a subject for a given attribute key,
/// optionally scoped to a validity window.
#[derive(Debug, Deserialize)]
pub struct AssignSubjectAttributeInput {
    pub subject_id: Uuid,
    pub attribute_key: String,
    pub value: String,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

/// Input for setting a resource's value for a given attribute key. No
/// temporal validity.
#[derive(Debug, Deserialize)]
pub struct SetResourceAttributeInput {
    pub resource_id: Uuid,
    pub attribute_key: String,
    pub value: String,
}
