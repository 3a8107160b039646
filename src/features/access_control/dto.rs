use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Wire shape for `POST /access/evaluate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckAccessRequest {
    pub subject_id: Uuid,
    pub resource_id: Uuid,
    pub action_id: Uuid,
    #[serde(default)]
    pub environment: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAccessResponse {
    pub decision: String,
    pub reason: String,
    pub deciding_policy_id: Option<Uuid>,
    pub evaluated_policy_count: usize,
}
