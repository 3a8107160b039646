use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::{AttributeValue, DecisionResult, Effect};
use crate::features::attributes::AttributeStore;
use crate::features::audit::{AuditWriter, NewAccessLog, PolicyOutcomeRecord};
use crate::features::environment::{EnvironmentProvider, RequestContext};
use crate::features::evaluation::{combine, evaluate_policy, AttributeBag, PolicyEvaluation, PolicyOutcome};
use crate::features::policies::PolicyCatalogue;
use crate::features::resources::ResourceService;

use super::dto::CheckAccessResponse;
use super::error::AccessControlError;

/// Default evaluation timeout enforced around the whole facade call, used
/// when the caller doesn't supply `Config::evaluation_timeout_secs`.
pub const DEFAULT_EVALUATION_TIMEOUT: Duration = Duration::from_secs(5);
/// Default independent, shorter deadline for the best-effort audit write
/// attempted on a fatal or timed-out evaluation, used when the caller
/// doesn't supply `Config::audit_best_effort_timeout_secs`.
pub const DEFAULT_AUDIT_BEST_EFFORT_TIMEOUT: Duration = Duration::from_secs(1);

/// Single entry point: accepts `(subjectId, resourceId, actionId, environment)`,
/// orchestrates the attribute store, catalogue, and combiner and returns a
/// decision.
#[derive(Clone)]
pub struct AccessControlFacade {
    resources: ResourceService,
    attributes: AttributeStore,
    catalogue: PolicyCatalogue,
    audit: AuditWriter,
    evaluation_timeout: Duration,
    audit_best_effort_timeout: Duration,
}

impl AccessControlFacade {
    pub fn new(
        resources: ResourceService,
        attributes: AttributeStore,
        catalogue: PolicyCatalogue,
        audit: AuditWriter,
    ) -> Self {
        Self::with_timeouts(
            resources,
            attributes,
            catalogue,
            audit,
            DEFAULT_EVALUATION_TIMEOUT,
            DEFAULT_AUDIT_BEST_EFFORT_TIMEOUT,
        )
    }

    /// Builds the facade with explicit timeouts, typically sourced from
    /// `crate::config::Config`.
    pub fn with_timeouts(
        resources: ResourceService,
        attributes: AttributeStore,
        catalogue: PolicyCatalogue,
        audit: AuditWriter,
        evaluation_timeout: Duration,
        audit_best_effort_timeout: Duration,
    ) -> Self {
        Self {
            resources,
            attributes,
            catalogue,
            audit,
            evaluation_timeout,
            audit_best_effort_timeout,
        }
    }

    /// Runs `checkAccess` under the caller's cancellation token and the
    /// fixed evaluation timeout, falling back to a best-effort audit write
    /// when evaluation fatally fails or times out.
    pub async fn check_access(
        &self,
        subject_id: Uuid,
        resource_id: Uuid,
        action_id: Uuid,
        env_overrides: HashMap<String, serde_json::Value>,
        ctx: RequestContext,
        cancellation: CancellationToken,
    ) -> Result<CheckAccessResponse, AccessControlError> {
        let evaluation = tokio::select! {
            result = tokio::time::timeout(
                self.evaluation_timeout,
                self.evaluate(subject_id, resource_id, action_id, env_overrides, ctx),
            ) => result,
            _ = cancellation.cancelled() => {
                // Cancelled before the audit write: no AccessLog is produced
                // for a call the caller abandoned.
                return Err(AccessControlError::EvaluationTimeout);
            }
        };

        match evaluation {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                self.best_effort_audit(subject_id, Some(resource_id), Some(action_id), &err)
                    .await;
                Err(err)
            }
            Err(_elapsed) => {
                let err = AccessControlError::EvaluationTimeout;
                self.best_effort_audit(subject_id, Some(resource_id), Some(action_id), &err)
                    .await;
                Err(err)
            }
        }
    }

    async fn evaluate(
        &self,
        subject_id: Uuid,
        resource_id: Uuid,
        action_id: Uuid,
        env_overrides: HashMap<String, serde_json::Value>,
        ctx: RequestContext,
    ) -> Result<CheckAccessResponse, AccessControlError> {
        let at = Utc::now();

        if !self.resources.exists(resource_id).await? {
            return Err(AccessControlError::ResourceNotFound);
        }

        let (policies, subject_attrs, resource_attrs) = tokio::try_join!(
            self.fetch_policies(action_id),
            self.fetch_subject_attrs(subject_id, at),
            self.fetch_resource_attrs(resource_id),
        )?;

        let overrides = overrides_to_bag(env_overrides);
        let environment_attrs = EnvironmentProvider::build(at, &ctx, &overrides);

        let evaluations: Vec<PolicyEvaluation> = policies
            .iter()
            .map(|policy| PolicyEvaluation {
                policy_id: policy.id,
                outcome: evaluate_policy(policy, &subject_attrs, &resource_attrs, &environment_attrs),
            })
            .collect();

        let combined = combine(&evaluations);

        let result = match combined.decision {
            Effect::Permit => DecisionResult::Permit,
            Effect::Deny => DecisionResult::Deny,
        };

        let ip_address = ctx.ip_address.clone();
        let environment_json = bag_to_json(&environment_attrs);
        let evaluated_policies = evaluations
            .iter()
            .map(|e| PolicyOutcomeRecord {
                policy_id: e.policy_id,
                outcome: outcome_label(&e.outcome),
            })
            .collect();

        self.audit
            .write(NewAccessLog {
                subject_id,
                resource_id: Some(resource_id),
                action_id: Some(action_id),
                policy_id: combined.deciding_policy_id,
                result,
                reason: combined.reason.clone(),
                environment: environment_json,
                evaluated_policies,
                ip_address,
            })
            .await?;

        Ok(CheckAccessResponse {
            decision: combined.decision.to_string(),
            reason: combined.reason,
            deciding_policy_id: combined.deciding_policy_id,
            evaluated_policy_count: evaluations.len(),
        })
    }

    async fn fetch_policies(&self, action_id: Uuid) -> Result<Vec<crate::domain::Policy>, AccessControlError> {
        Ok(self.catalogue.list_applicable_policies(action_id).await?)
    }

    async fn fetch_subject_attrs(&self, subject_id: Uuid, at: chrono::DateTime<Utc>) -> Result<AttributeBag, AccessControlError> {
        Ok(self.attributes.get_active_subject_attributes(subject_id, at).await?)
    }

    async fn fetch_resource_attrs(&self, resource_id: Uuid) -> Result<AttributeBag, AccessControlError> {
        Ok(self.attributes.get_resource_attributes(resource_id).await?)
    }

    /// Attempts to record a failed decision with a short independent
    /// deadline. Failures here are logged, never propagated: the caller
    /// already has the original error to react to.
    async fn best_effort_audit(
        &self,
        subject_id: Uuid,
        resource_id: Option<Uuid>,
        action_id: Option<Uuid>,
        err: &AccessControlError,
    ) {
        let (result, reason) = match err {
            AccessControlError::ResourceNotFound => (DecisionResult::Error, "Resource not found".to_string()),
            AccessControlError::EvaluationTimeout => (DecisionResult::Error, "Evaluation timeout".to_string()),
            AccessControlError::StoreUnavailable(_) => (DecisionResult::Error, "Store unavailable".to_string()),
            AccessControlError::AuditWriteError(_) => return,
        };

        let outcome = tokio::time::timeout(
            self.audit_best_effort_timeout,
            self.audit.write(NewAccessLog {
                subject_id,
                resource_id,
                action_id,
                policy_id: None,
                result,
                reason,
                environment: serde_json::json!({}),
                evaluated_policies: Vec::new(),
                ip_address: None,
            }),
        )
        .await;

        if let Err(_elapsed) = outcome {
            tracing::error!("best-effort audit write timed out");
        } else if let Ok(Err(write_err)) = outcome {
            tracing::error!(?write_err, "best-effort audit write failed");
        }
    }
}

fn outcome_label(outcome: &PolicyOutcome) -> String {
    match outcome {
        PolicyOutcome::Applies(effect) => format!("Applies({effect})"),
        PolicyOutcome::NotApplicable => "NotApplicable".to_string(),
        PolicyOutcome::Indeterminate(err) => format!("Indeterminate({err})"),
    }
}

fn overrides_to_bag(overrides: HashMap<String, serde_json::Value>) -> AttributeBag {
    let mut bag = AttributeBag::new();
    for (key, value) in overrides {
        match json_to_attribute_value(&value) {
            Ok(v) => bag.insert(key, v),
            Err(reason) => bag.insert_unparseable(key, reason),
        }
    }
    bag
}

fn json_to_attribute_value(value: &serde_json::Value) -> Result<AttributeValue, String> {
    match value {
        serde_json::Value::String(s) => Ok(AttributeValue::String(s.clone())),
        serde_json::Value::Bool(b) => Ok(AttributeValue::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(AttributeValue::Number)
            .ok_or_else(|| format!("'{n}' is not a representable Number")),
        other => Err(format!("unsupported environment value: {other}")),
    }
}

fn bag_to_json(bag: &AttributeBag) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, value) in bag {
        let v = match value {
            Ok(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
            Err(reason) => serde_json::json!({ "error": reason }),
        };
        map.insert(key.clone(), v);
    }
    serde_json::Value::Object(map)
}
