use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use thiserror::Error;

use crate::domain::AccessLog;

use super::models::{
    AuditFilter, AuditSort, AuditStatistics, Page, PagedAccessLogs, PolicyDenyEntry, TopEntry,
    MAX_PAGE_SIZE, MAX_TOP_N, MIN_PAGE_SIZE,
};

#[derive(Debug, Error)]
pub enum AuditQueryError {
    #[error("database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Paged/filterable queries and aggregate statistics over audit records.
/// Read-only, never mutates.
#[derive(Clone)]
pub struct AuditReader {
    pool: PgPool,
}

impl AuditReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn query(
        &self,
        filter: AuditFilter,
        sort: AuditSort,
        page: Page,
    ) -> Result<PagedAccessLogs, AuditQueryError> {
        if page.size < MIN_PAGE_SIZE || page.size > MAX_PAGE_SIZE {
            return Err(AuditQueryError::InvalidInput(format!(
                "page size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}"
            )));
        }

        let mut count_builder = QueryBuilder::new(
            "SELECT COUNT(*) FROM access_logs WHERE is_deleted = false",
        );
        push_filters(&mut count_builder, &filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut select_builder = QueryBuilder::new(
            "SELECT id, created_at, subject_id, resource_id, action_id, policy_id,
                    result, reason, context_json, ip_address, is_deleted
             FROM access_logs WHERE is_deleted = false",
        );
        push_filters(&mut select_builder, &filter);
        select_builder
            .push(" ORDER BY ")
            .push(sort.field.column())
            .push(" ")
            .push(sort.direction.keyword())
            .push(", id ASC LIMIT ")
            .push_bind(page.size as i64)
            .push(" OFFSET ")
            .push_bind((page.number as i64) * (page.size as i64));

        let items = select_builder
            .build_query_as::<AccessLog>()
            .fetch_all(&self.pool)
            .await?;

        Ok(PagedAccessLogs {
            items,
            page: page.number,
            page_size: page.size,
            total,
        })
    }

    pub async fn statistics(
        &self,
        from_time: Option<DateTime<Utc>>,
        to_time: Option<DateTime<Utc>>,
    ) -> Result<AuditStatistics, AuditQueryError> {
        let mut builder = QueryBuilder::new(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE result = 'Permit') AS permits,
                COUNT(*) FILTER (WHERE result = 'Deny') AS denies,
                COUNT(*) FILTER (WHERE result = 'Error') AS errors
            FROM access_logs
            WHERE is_deleted = false
            "#,
        );
        push_time_range(&mut builder, from_time, to_time);

        let (total, permits, denies, errors): (i64, i64, i64, i64) = builder
            .build_query_as()
            .fetch_one(&self.pool)
            .await?;

        let rate = |n: i64| if total == 0 { 0.0 } else { n as f64 / total as f64 };

        Ok(AuditStatistics {
            total,
            permits,
            denies,
            errors,
            permit_rate: rate(permits),
            deny_rate: rate(denies),
            error_rate: rate(errors),
        })
    }

    pub async fn top_resources(&self, n: u32, range: TimeRange) -> Result<Vec<TopEntry>, AuditQueryError> {
        self.top_by("resource_id", n, range).await
    }

    pub async fn top_subjects(&self, n: u32, range: TimeRange) -> Result<Vec<TopEntry>, AuditQueryError> {
        self.top_by("subject_id", n, range).await
    }

    async fn top_by(
        &self,
        column: &str,
        n: u32,
        range: TimeRange,
    ) -> Result<Vec<TopEntry>, AuditQueryError> {
        if n == 0 || n > MAX_TOP_N {
            return Err(AuditQueryError::InvalidInput(format!(
                "n must be between 1 and {MAX_TOP_N}"
            )));
        }

        let mut builder = QueryBuilder::new(format!(
            "SELECT {column} AS id, COUNT(*) AS count FROM access_logs WHERE is_deleted = false AND {column} IS NOT NULL"
        ));
        push_time_range(&mut builder, range.from_time, range.to_time);
        builder
            .push(format!(" GROUP BY {column} ORDER BY count DESC, {column} ASC LIMIT "))
            .push_bind(n as i64);

        let rows = builder
            .build_query_as::<TopEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn denies_by_policy(&self, range: TimeRange) -> Result<Vec<PolicyDenyEntry>, AuditQueryError> {
        let mut builder = QueryBuilder::new(
            "SELECT policy_id, COUNT(*) AS count FROM access_logs
             WHERE is_deleted = false AND result = 'Deny'",
        );
        push_time_range(&mut builder, range.from_time, range.to_time);
        builder.push(" GROUP BY policy_id ORDER BY count DESC, policy_id ASC NULLS LAST");

        let rows = builder
            .build_query_as::<PolicyDenyEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TimeRange {
    pub from_time: Option<DateTime<Utc>>,
    pub to_time: Option<DateTime<Utc>>,
}

fn push_time_range(
    builder: &mut QueryBuilder<'_, sqlx::Postgres>,
    from_time: Option<DateTime<Utc>>,
    to_time: Option<DateTime<Utc>>,
) {
    if let Some(from) = from_time {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = to_time {
        builder.push(" AND created_at <= ").push_bind(to);
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, sqlx::Postgres>, filter: &AuditFilter) {
    if let Some(subject_id) = filter.subject_id {
        builder.push(" AND subject_id = ").push_bind(subject_id);
    }
    if let Some(resource_id) = filter.resource_id {
        builder.push(" AND resource_id = ").push_bind(resource_id);
    }
    if let Some(action_id) = filter.action_id {
        builder.push(" AND action_id = ").push_bind(action_id);
    }
    if let Some(result) = filter.result {
        builder.push(" AND result = ").push_bind(result);
    }
    push_time_range(builder, filter.from_time, filter.to_time);
}
