use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::models::{AuditFilter, AuditSort, AuditSortField, Page, SortDirection};
use super::reader::{AuditQueryError, AuditReader, TimeRange};
use crate::domain::DecisionResult;

pub fn audit_routes() -> Router<AuditReader> {
    Router::new()
        .route("/", get(query_logs))
        .route("/statistics", get(statistics))
        .route("/top-resources", get(top_resources))
        .route("/top-subjects", get(top_subjects))
        .route("/denies-by-policy", get(denies_by_policy))
}

impl From<&AuditQueryError> for StatusCode {
    fn from(err: &AuditQueryError) -> Self {
        match err {
            AuditQueryError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuditQueryError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Deserialize)]
struct QueryParams {
    subject_id: Option<Uuid>,
    resource_id: Option<Uuid>,
    action_id: Option<Uuid>,
    result: Option<DecisionResult>,
    from_time: Option<DateTime<Utc>>,
    to_time: Option<DateTime<Utc>>,
    sort_field: Option<AuditSortField>,
    sort_direction: Option<SortDirection>,
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn query_logs(
    State(reader): State<AuditReader>,
    Query(params): Query<QueryParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let filter = AuditFilter {
        subject_id: params.subject_id,
        resource_id: params.resource_id,
        action_id: params.action_id,
        result: params.result,
        from_time: params.from_time,
        to_time: params.to_time,
    };
    let sort = AuditSort {
        field: params.sort_field.unwrap_or(AuditSortField::CreatedAt),
        direction: params.sort_direction.unwrap_or(SortDirection::Desc),
    };
    let page = Page {
        number: params.page.unwrap_or(0),
        size: params.page_size.unwrap_or(super::models::DEFAULT_PAGE_SIZE),
    };

    let result = reader.query(filter, sort, page).await.map_err(|err| {
        tracing::error!(?err, "audit query failed");
        StatusCode::from(&err)
    })?;
    Ok(Json(serde_json::json!(result)))
}

#[derive(Deserialize)]
struct RangeParams {
    from_time: Option<DateTime<Utc>>,
    to_time: Option<DateTime<Utc>>,
}

async fn statistics(
    State(reader): State<AuditReader>,
    Query(params): Query<RangeParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let stats = reader
        .statistics(params.from_time, params.to_time)
        .await
        .map_err(|err| {
            tracing::error!(?err, "audit statistics failed");
            StatusCode::from(&err)
        })?;
    Ok(Json(serde_json::json!(stats)))
}

#[derive(Deserialize)]
struct TopParams {
    n: Option<u32>,
    from_time: Option<DateTime<Utc>>,
    to_time: Option<DateTime<Utc>>,
}

async fn top_resources(
    State(reader): State<AuditReader>,
    Query(params): Query<TopParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let range = TimeRange {
        from_time: params.from_time,
        to_time: params.to_time,
    };
    let entries = reader
        .top_resources(params.n.unwrap_or(10), range)
        .await
        .map_err(|err| StatusCode::from(&err))?;
    Ok(Json(serde_json::json!(entries)))
}

async fn top_subjects(
    State(reader): State<AuditReader>,
    Query(params): Query<TopParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let range = TimeRange {
        from_time: params.from_time,
        to_time: params.to_time,
    };
    let entries = reader
        .top_subjects(params.n.unwrap_or(10), range)
        .await
        .map_err(|err| StatusCode::from(&err))?;
    Ok(Json(serde_json::json!(entries)))
}

async fn denies_by_policy(
    State(reader): State<AuditReader>,
    Query(params): Query<RangeParams>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let range = TimeRange {
        from_time: params.from_time,
        to_time: params.to_time,
    };
    let entries = reader
        .denies_by_policy(range)
        .await
        .map_err(|err| StatusCode::from(&err))?;
    Ok(Json(serde_json::json!(entries)))
}
