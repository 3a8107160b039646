use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::policy::PolicyRow;
use crate::domain::{Policy, PolicyCondition};

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Stores policies, their conditions, and action bindings; exposes
/// "list policies applicable to an action".
#[derive(Clone)]
pub struct PolicyCatalogue {
    pool: PgPool,
}

impl PolicyCatalogue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Policies bound to `action_id`, active, not deleted, with at least
    /// one live [`crate::domain::PolicyAction`] binding. Sorted by
    /// `(priority DESC, id ASC)` — ties broken by id so evaluation is
    /// deterministic. Conditions are eagerly loaded, each
    /// pre-sorted `id ASC` so C5 can evaluate them in order without
    /// re-sorting.
    pub async fn list_applicable_policies(&self, action_id: Uuid) -> Result<Vec<Policy>, CatalogueError> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT DISTINCT p.id, p.name, p.description, p.effect, p.priority,
                   p.is_active, p.is_deleted, p.created_at, p.updated_at
            FROM policies p
            JOIN policy_actions pa ON pa.policy_id = p.id
            WHERE pa.action_id = $1
              AND pa.is_deleted = false
              AND p.is_active = true
              AND p.is_deleted = false
            ORDER BY p.priority DESC, p.id ASC
            "#,
        )
        .bind(action_id)
        .fetch_all(&self.pool)
        .await?;

        let mut policies = Vec::with_capacity(rows.len());
        for row in rows {
            let conditions = self.load_conditions(row.id).await?;
            policies.push(row.into_policy(conditions));
        }
        Ok(policies)
    }

    async fn load_conditions(&self, policy_id: Uuid) -> Result<Vec<PolicyCondition>, CatalogueError> {
        let conditions = sqlx::query_as::<_, PolicyCondition>(
            r#"
            SELECT id, policy_id, attribute_category, attribute_key, operator, expected_value,
                   is_deleted, created_at
            FROM policy_conditions
            WHERE policy_id = $1 AND is_deleted = false
            ORDER BY id ASC
            "#,
        )
        .bind(policy_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(conditions)
    }
}
