use serde::Deserialize;

use crate::domain::AttributeType;

/// Input for registering a new [`crate::domain::AttributeSchema`].
#[derive(Debug, Deserialize)]
pub struct CreateSchemaInput {
    pub name: String,
    pub key: String,
    pub r#type: AttributeType,
    pub description: Option<String>,
}
