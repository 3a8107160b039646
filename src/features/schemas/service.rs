use regex::Regex;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::AttributeSchema;

use super::models::CreateSchemaInput;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Administers [`AttributeSchema`] rows — the attribute store resolves
/// subject/resource values against these. Key uniqueness among live
/// schemas is enforced by a partial unique index; `key` format is
/// validated here before it ever reaches the database.
#[derive(Clone)]
pub struct SchemaService {
    pool: PgPool,
}

impl SchemaService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_schema(&self, input: CreateSchemaInput) -> Result<AttributeSchema, SchemaError> {
        validate_key(&input.key)?;

        let schema = sqlx::query_as::<_, AttributeSchema>(
            r#"
            INSERT INTO attribute_schemas (name, key, attribute_type, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, key, attribute_type, description, is_deleted, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.key)
        .bind(input.r#type)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(schema)
    }

    pub async fn get_by_key(&self, key: &str) -> Result<Option<AttributeSchema>, SchemaError> {
        let schema = sqlx::query_as::<_, AttributeSchema>(
            "SELECT id, name, key, attribute_type, description, is_deleted, created_at, updated_at
             FROM attribute_schemas WHERE key = $1 AND is_deleted = false",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(schema)
    }

    pub async fn list_schemas(&self) -> Result<Vec<AttributeSchema>, SchemaError> {
        let schemas = sqlx::query_as::<_, AttributeSchema>(
            "SELECT id, name, key, attribute_type, description, is_deleted, created_at, updated_at
             FROM attribute_schemas WHERE is_deleted = false ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(schemas)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), SchemaError> {
        let result = sqlx::query("UPDATE attribute_schemas SET is_deleted = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(SchemaError::NotFound(format!("schema '{id}' not found")));
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<(), SchemaError> {
    let re = Regex::new(crate::domain::schema::KEY_PATTERN).expect("static pattern is valid");
    if re.is_match(key) {
        Ok(())
    } else {
        Err(SchemaError::InvalidInput(format!(
            "key '{key}' must match {}",
            crate::domain::schema::KEY_PATTERN
        )))
    }
}
