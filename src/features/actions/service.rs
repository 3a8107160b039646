use regex::Regex;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Action;
use crate::domain::schema::KEY_PATTERN;

use super::models::CreateActionInput;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Administers the action catalogue that [`crate::domain::PolicyAction`]
/// bindings and access requests reference by `code`.
#[derive(Clone)]
pub struct ActionService {
    pool: PgPool,
}

impl ActionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_action(&self, input: CreateActionInput) -> Result<Action, ActionError> {
        validate_code(&input.code)?;

        let action = sqlx::query_as::<_, Action>(
            r#"
            INSERT INTO actions (name, code, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, code, description, is_deleted, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(action)
    }

    pub async fn get_by_code(&self, code: &str) -> Result<Option<Action>, ActionError> {
        let action = sqlx::query_as::<_, Action>(
            "SELECT id, name, code, description, is_deleted, created_at
             FROM actions WHERE code = $1 AND is_deleted = false",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(action)
    }

    pub async fn list_actions(&self) -> Result<Vec<Action>, ActionError> {
        let actions = sqlx::query_as::<_, Action>(
            "SELECT id, name, code, description, is_deleted, created_at
             FROM actions WHERE is_deleted = false ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(actions)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), ActionError> {
        let result = sqlx::query("UPDATE actions SET is_deleted = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ActionError::NotFound(format!("action '{id}' not found")));
        }
        Ok(())
    }
}

fn validate_code(code: &str) -> Result<(), ActionError> {
    let re = Regex::new(KEY_PATTERN).expect("static pattern is valid");
    if re.is_match(code) {
        Ok(())
    } else {
        Err(ActionError::InvalidInput(format!(
            "code '{code}' must match {KEY_PATTERN}"
        )))
    }
}
