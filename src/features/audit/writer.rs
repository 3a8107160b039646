use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{AccessLog, DecisionResult};

const MAX_CONTEXT_POLICIES: usize = 64;

#[derive(Debug, Error)]
pub enum AuditWriteError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// One per-policy outcome contributing to a decision, folded into
/// `contextJson` alongside the environment map.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PolicyOutcomeRecord {
    pub policy_id: Uuid,
    pub outcome: String,
}

pub struct NewAccessLog {
    pub subject_id: Uuid,
    pub resource_id: Option<Uuid>,
    pub action_id: Option<Uuid>,
    pub policy_id: Option<Uuid>,
    pub result: DecisionResult,
    pub reason: String,
    pub environment: serde_json::Value,
    pub evaluated_policies: Vec<PolicyOutcomeRecord>,
    pub ip_address: Option<String>,
}

/// Appends exactly one immutable record per decision, synchronously,
/// before the decision is returned to the caller. Failure here fails the
/// whole evaluation — silent audit loss is never acceptable for this
/// system.
#[derive(Clone)]
pub struct AuditWriter {
    pool: PgPool,
}

impl AuditWriter {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn write(&self, log: NewAccessLog) -> Result<AccessLog, AuditWriteError> {
        let context_json = build_context_json(log.environment, log.evaluated_policies);

        let row = sqlx::query_as::<_, AccessLog>(
            r#"
            INSERT INTO access_logs
                (subject_id, resource_id, action_id, policy_id, result, reason, context_json, ip_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, created_at, subject_id, resource_id, action_id, policy_id,
                      result, reason, context_json, ip_address, is_deleted
            "#,
        )
        .bind(log.subject_id)
        .bind(log.resource_id)
        .bind(log.action_id)
        .bind(log.policy_id)
        .bind(log.result)
        .bind(&log.reason)
        .bind(&context_json)
        .bind(&log.ip_address)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}

fn build_context_json(
    environment: serde_json::Value,
    evaluated_policies: Vec<PolicyOutcomeRecord>,
) -> serde_json::Value {
    let truncated = evaluated_policies.len() > MAX_CONTEXT_POLICIES;
    let policies: Vec<_> = evaluated_policies
        .into_iter()
        .take(MAX_CONTEXT_POLICIES)
        .map(|p| serde_json::json!({ "policyId": p.policy_id, "outcome": p.outcome }))
        .collect();

    serde_json::json!({
        "environment": environment,
        "evaluatedPolicies": policies,
        "truncated": truncated,
    })
}
