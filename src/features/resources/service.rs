use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Resource;

use super::models::CreateResourceInput;

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Administers `resources` rows. The decision engine only needs to know
/// whether a resource exists and is live; everything else attached to a
/// resource lives in [`crate::domain::ResourceAttribute`].
#[derive(Clone)]
pub struct ResourceService {
    pool: PgPool,
}

impl ResourceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_resource(&self, input: CreateResourceInput) -> Result<Resource, ResourceError> {
        let resource = sqlx::query_as::<_, Resource>(
            "INSERT INTO resources (name) VALUES ($1) RETURNING id, name, is_deleted, created_at",
        )
        .bind(&input.name)
        .fetch_one(&self.pool)
        .await?;
        Ok(resource)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Resource>, ResourceError> {
        let resource = sqlx::query_as::<_, Resource>(
            "SELECT id, name, is_deleted, created_at FROM resources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(resource)
    }

    /// `true` only if the resource exists and is not soft-deleted.
    pub async fn exists(&self, id: Uuid) -> Result<bool, ResourceError> {
        let row: Option<(bool,)> = sqlx::query_as(
            "SELECT is_deleted FROM resources WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(matches!(row, Some((is_deleted,)) if !is_deleted))
    }

    pub async fn list_resources(&self) -> Result<Vec<Resource>, ResourceError> {
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT id, name, is_deleted, created_at FROM resources WHERE is_deleted = false ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(resources)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), ResourceError> {
        let result = sqlx::query("UPDATE resources SET is_deleted = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ResourceError::NotFound(format!("resource '{id}' not found")));
        }
        Ok(())
    }
}
