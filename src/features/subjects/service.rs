use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::Subject;

#[derive(Debug, Error)]
pub enum SubjectError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Administers `subjects` rows. A subject carries no attributes of its own;
/// it exists only so `subject_attributes` has something to reference.
#[derive(Clone)]
pub struct SubjectService {
    pool: PgPool,
}

impl SubjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_subject(&self) -> Result<Subject, SubjectError> {
        let subject = sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects DEFAULT VALUES RETURNING id, is_deleted, created_at",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(subject)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Subject>, SubjectError> {
        let subject = sqlx::query_as::<_, Subject>(
            "SELECT id, is_deleted, created_at FROM subjects WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(subject)
    }

    /// `true` only if the subject exists and is not soft-deleted.
    pub async fn exists(&self, id: Uuid) -> Result<bool, SubjectError> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT is_deleted FROM subjects WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(matches!(row, Some((is_deleted,)) if !is_deleted))
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, SubjectError> {
        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT id, is_deleted, created_at FROM subjects WHERE is_deleted = false ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(subjects)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), SubjectError> {
        let result = sqlx::query("UPDATE subjects SET is_deleted = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(SubjectError::NotFound(format!("subject '{id}' not found")));
        }
        Ok(())
    }
}
