use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::policy::PolicyRow;
use crate::domain::{Policy, PolicyCondition};

use super::models::{CreateConditionInput, CreatePolicyInput, UpdatePolicyInput};

#[derive(Debug, Error)]
pub enum PolicyAdminError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Administers policies, their conditions, and their action bindings.
/// Mutations that touch more than one table run in a single transaction
/// so the catalogue never exposes a partial policy to a concurrent
/// evaluation.
#[derive(Clone)]
pub struct PolicyAdmin {
    pool: PgPool,
}

impl PolicyAdmin {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_policies(&self) -> Result<Vec<PolicyRow>, PolicyAdminError> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            "SELECT id, name, description, effect, priority, is_active, is_deleted, created_at, updated_at
             FROM policies WHERE is_deleted = false ORDER BY priority DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_policy(&self, id: Uuid) -> Result<Policy, PolicyAdminError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            "SELECT id, name, description, effect, priority, is_active, is_deleted, created_at, updated_at
             FROM policies WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PolicyAdminError::NotFound(format!("policy '{id}' not found")))?;

        let conditions = sqlx::query_as::<_, PolicyCondition>(
            "SELECT id, policy_id, attribute_category, attribute_key, operator, expected_value, is_deleted, created_at
             FROM policy_conditions WHERE policy_id = $1 AND is_deleted = false ORDER BY id ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(row.into_policy(conditions))
    }

    /// Creates a policy with its conditions and action bindings atomically.
    pub async fn create_policy(&self, input: CreatePolicyInput) -> Result<Policy, PolicyAdminError> {
        for c in &input.conditions {
            validate_condition(c)?;
        }

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            INSERT INTO policies (name, description, effect, priority, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, effect, priority, is_active, is_deleted, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.effect)
        .bind(input.priority)
        .bind(input.is_active.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await?;

        let mut conditions = Vec::with_capacity(input.conditions.len());
        for c in &input.conditions {
            let condition = sqlx::query_as::<_, PolicyCondition>(
                r#"
                INSERT INTO policy_conditions (policy_id, attribute_category, attribute_key, operator, expected_value)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, policy_id, attribute_category, attribute_key, operator, expected_value, is_deleted, created_at
                "#,
            )
            .bind(row.id)
            .bind(c.attribute_category)
            .bind(&c.attribute_key)
            .bind(c.operator)
            .bind(&c.expected_value)
            .fetch_one(&mut *tx)
            .await?;
            conditions.push(condition);
        }

        for action_id in &input.action_ids {
            sqlx::query("INSERT INTO policy_actions (policy_id, action_id) VALUES ($1, $2)")
                .bind(row.id)
                .bind(action_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(row.into_policy(conditions))
    }

    pub async fn update_policy(
        &self,
        id: Uuid,
        input: UpdatePolicyInput,
    ) -> Result<Policy, PolicyAdminError> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            UPDATE policies SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                effect = COALESCE($4, effect),
                priority = COALESCE($5, priority),
                is_active = COALESCE($6, is_active),
                updated_at = now()
            WHERE id = $1 AND is_deleted = false
            RETURNING id, name, description, effect, priority, is_active, is_deleted, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.effect)
        .bind(input.priority)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| PolicyAdminError::NotFound(format!("policy '{id}' not found")))?;

        let conditions = sqlx::query_as::<_, PolicyCondition>(
            "SELECT id, policy_id, attribute_category, attribute_key, operator, expected_value, is_deleted, created_at
             FROM policy_conditions WHERE policy_id = $1 AND is_deleted = false ORDER BY id ASC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(row.into_policy(conditions))
    }

    /// Soft-deletes a policy and cascades to its owned conditions and
    /// action bindings. Does NOT touch `access_logs` — its `policy_id`
    /// foreign key is nullified by the database, never cascade-deleted,
    /// so decision history survives policy deletion.
    pub async fn delete_policy(&self, id: Uuid) -> Result<(), PolicyAdminError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE policies SET is_deleted = true WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(PolicyAdminError::NotFound(format!("policy '{id}' not found")));
        }

        sqlx::query("UPDATE policy_conditions SET is_deleted = true WHERE policy_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE policy_actions SET is_deleted = true WHERE policy_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE access_logs SET policy_id = NULL WHERE policy_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn add_condition(
        &self,
        policy_id: Uuid,
        input: CreateConditionInput,
    ) -> Result<PolicyCondition, PolicyAdminError> {
        validate_condition(&input)?;

        let condition = sqlx::query_as::<_, PolicyCondition>(
            r#"
            INSERT INTO policy_conditions (policy_id, attribute_category, attribute_key, operator, expected_value)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, policy_id, attribute_category, attribute_key, operator, expected_value, is_deleted, created_at
            "#,
        )
        .bind(policy_id)
        .bind(input.attribute_category)
        .bind(&input.attribute_key)
        .bind(input.operator)
        .bind(&input.expected_value)
        .fetch_one(&self.pool)
        .await?;
        Ok(condition)
    }

    pub async fn bind_action(&self, policy_id: Uuid, action_id: Uuid) -> Result<(), PolicyAdminError> {
        sqlx::query(
            "INSERT INTO policy_actions (policy_id, action_id) VALUES ($1, $2)
             ON CONFLICT (policy_id, action_id) DO UPDATE SET is_deleted = false",
        )
        .bind(policy_id)
        .bind(action_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn unbind_action(&self, policy_id: Uuid, action_id: Uuid) -> Result<(), PolicyAdminError> {
        sqlx::query(
            "UPDATE policy_actions SET is_deleted = true WHERE policy_id = $1 AND action_id = $2",
        )
        .bind(policy_id)
        .bind(action_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

const MAX_EXPECTED_VALUE_LEN: usize = 500;

fn validate_condition(input: &CreateConditionInput) -> Result<(), PolicyAdminError> {
    if input.expected_value.len() > MAX_EXPECTED_VALUE_LEN {
        return Err(PolicyAdminError::InvalidInput(format!(
            "expectedValue must be at most {MAX_EXPECTED_VALUE_LEN} chars"
        )));
    }
    Ok(())
}
