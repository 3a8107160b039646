use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{AttributeSchema, AttributeType, SubjectAttribute};
use crate::features::evaluation::condition::AttributeBag;

use super::models::{AssignSubjectAttributeInput, SetResourceAttributeInput};

#[derive(Debug, Error)]
pub enum AttributeStoreError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("unknown attribute key '{0}'")]
    UnknownAttribute(String),
}

struct ValueRow {
    key: String,
    attribute_type: AttributeType,
    value: String,
}

/// Joins a `subject_attributes` row against its schema. Carries every
/// field `SubjectAttribute::active_at` needs so the temporal check stays
/// in one place instead of being duplicated in SQL.
#[derive(sqlx::FromRow)]
struct SubjectAttributeJoinRow {
    id: Uuid,
    subject_id: Uuid,
    attribute_id: Uuid,
    value: String,
    valid_from: Option<DateTime<Utc>>,
    valid_to: Option<DateTime<Utc>>,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    key: String,
    attribute_type: AttributeType,
}

impl SubjectAttributeJoinRow {
    fn as_subject_attribute(&self) -> SubjectAttribute {
        SubjectAttribute {
            id: self.id,
            subject_id: self.subject_id,
            attribute_id: self.attribute_id,
            value: self.value.clone(),
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            is_deleted: self.is_deleted,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Persists attribute schemas and the typed values bound to subjects and
/// resources; answers point queries by `(owner, key)`.
#[derive(Clone)]
pub struct AttributeStore {
    pool: PgPool,
}

impl AttributeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_schema_by_key(&self, key: &str) -> Result<Option<AttributeSchema>, AttributeStoreError> {
        let schema = sqlx::query_as::<_, AttributeSchema>(
            "SELECT id, name, key, attribute_type, description, is_deleted, created_at, updated_at
             FROM attribute_schemas WHERE key = $1 AND is_deleted = false",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(schema)
    }

    /// Returns a defensive-copy map of all subject attributes active at
    /// `at`. Values that fail to parse against their schema's type are
    /// recorded in the bag as a per-key type error rather than dropped or
    /// surfaced as a call-level failure. Temporal validity is decided by
    /// [`SubjectAttribute::active_at`], not re-derived here.
    pub async fn get_active_subject_attributes(
        &self,
        subject_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<AttributeBag, AttributeStoreError> {
        let rows = sqlx::query_as::<_, SubjectAttributeJoinRow>(
            r#"
            SELECT sa.id, sa.subject_id, sa.attribute_id, sa.value, sa.valid_from, sa.valid_to,
                   sa.is_deleted, sa.created_at, sa.updated_at, s.key, s.attribute_type
            FROM subject_attributes sa
            JOIN attribute_schemas s ON s.id = sa.attribute_id
            WHERE sa.subject_id = $1
              AND sa.is_deleted = false
              AND s.is_deleted = false
            "#,
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        let values = rows.into_iter().filter_map(|row| {
            row.as_subject_attribute().active_at(at).then(|| ValueRow {
                key: row.key,
                attribute_type: row.attribute_type,
                value: row.value,
            })
        });

        Ok(rows_to_bag(values))
    }

    /// Returns a defensive-copy map of all live resource attributes, no
    /// temporal filter.
    pub async fn get_resource_attributes(
        &self,
        resource_id: Uuid,
    ) -> Result<AttributeBag, AttributeStoreError> {
        let rows = sqlx::query_as::<_, (String, AttributeType, String)>(
            r#"
            SELECT s.key, s.attribute_type, ra.value
            FROM resource_attributes ra
            JOIN attribute_schemas s ON s.id = ra.attribute_id
            WHERE ra.resource_id = $1
              AND ra.is_deleted = false
              AND s.is_deleted = false
            "#,
        )
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|(key, attribute_type, value)| ValueRow {
            key,
            attribute_type,
            value,
        });

        Ok(rows_to_bag(rows))
    }

    pub async fn assign_subject_attribute(
        &self,
        input: AssignSubjectAttributeInput,
    ) -> Result<(), AttributeStoreError> {
        let schema = self
            .get_schema_by_key(&input.attribute_key)
            .await?
            .ok_or_else(|| AttributeStoreError::UnknownAttribute(input.attribute_key.clone()))?;

        sqlx::query(
            r#"
            INSERT INTO subject_attributes (subject_id, attribute_id, value, valid_from, valid_to)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(input.subject_id)
        .bind(schema.id)
        .bind(&input.value)
        .bind(input.valid_from)
        .bind(input.valid_to)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn revoke_subject_attribute(
        &self,
        subject_id: Uuid,
        attribute_key: &str,
    ) -> Result<(), AttributeStoreError> {
        let schema = self
            .get_schema_by_key(attribute_key)
            .await?
            .ok_or_else(|| AttributeStoreError::UnknownAttribute(attribute_key.to_string()))?;

        sqlx::query(
            "UPDATE subject_attributes SET is_deleted = true
             WHERE subject_id = $1 AND attribute_id = $2 AND is_deleted = false",
        )
        .bind(subject_id)
        .bind(schema.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn set_resource_attribute(
        &self,
        input: SetResourceAttributeInput,
    ) -> Result<(), AttributeStoreError> {
        let schema = self
            .get_schema_by_key(&input.attribute_key)
            .await?
            .ok_or_else(|| AttributeStoreError::UnknownAttribute(input.attribute_key.clone()))?;

        sqlx::query(
            r#"
            INSERT INTO resource_attributes (resource_id, attribute_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (resource_id, attribute_id)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now(), is_deleted = false
            "#,
        )
        .bind(input.resource_id)
        .bind(schema.id)
        .bind(&input.value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_resource_attribute(
        &self,
        resource_id: Uuid,
        attribute_key: &str,
    ) -> Result<(), AttributeStoreError> {
        let schema = self
            .get_schema_by_key(attribute_key)
            .await?
            .ok_or_else(|| AttributeStoreError::UnknownAttribute(attribute_key.to_string()))?;

        sqlx::query(
            "UPDATE resource_attributes SET is_deleted = true
             WHERE resource_id = $1 AND attribute_id = $2",
        )
        .bind(resource_id)
        .bind(schema.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

fn rows_to_bag(rows: impl Iterator<Item = ValueRow>) -> AttributeBag {
    let mut bag = AttributeBag::new();
    for row in rows {
        match row.attribute_type.parse(&row.value) {
            Ok(value) => bag.insert(row.key, value),
            Err(reason) => bag.insert_unparseable(row.key, reason),
        }
    }
    bag
}
