use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::models::CreateSchemaInput;
use super::service::SchemaService;
use crate::domain::AttributeSchema;

pub fn schema_routes() -> Router<SchemaService> {
    Router::new()
        .route("/", get(list_schemas).post(create_schema))
        .route("/:key", get(get_schema))
        .route("/id/:id", axum::routing::delete(delete_schema))
}

async fn list_schemas(
    State(service): State<SchemaService>,
) -> Result<Json<Vec<AttributeSchema>>, StatusCode> {
    service
        .list_schemas()
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_schema(
    State(service): State<SchemaService>,
    Json(input): Json<CreateSchemaInput>,
) -> Result<Json<AttributeSchema>, (StatusCode, Json<serde_json::Value>)> {
    service.create_schema(input).await.map(Json).map_err(|e| {
        tracing::error!("failed to create attribute schema: {e}");
        let status = match e {
            super::service::SchemaError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            super::service::SchemaError::NotFound(_) => StatusCode::NOT_FOUND,
            super::service::SchemaError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": e.to_string() })))
    })
}

async fn get_schema(
    State(service): State<SchemaService>,
    Path(key): Path<String>,
) -> Result<Json<AttributeSchema>, StatusCode> {
    service
        .get_by_key(&key)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_schema(
    State(service): State<SchemaService>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    service
        .soft_delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
