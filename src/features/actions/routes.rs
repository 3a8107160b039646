use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::models::CreateActionInput;
use super::service::{ActionError, ActionService};
use crate::domain::Action;

pub fn action_routes() -> Router<ActionService> {
    Router::new()
        .route("/", get(list_actions).post(create_action))
        .route("/:code", get(get_action))
        .route("/id/:id", axum::routing::delete(delete_action))
}

async fn list_actions(State(service): State<ActionService>) -> Result<Json<Vec<Action>>, StatusCode> {
    service
        .list_actions()
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_action(
    State(service): State<ActionService>,
    Json(input): Json<CreateActionInput>,
) -> Result<Json<Action>, (StatusCode, Json<serde_json::Value>)> {
    service.create_action(input).await.map(Json).map_err(|e| {
        tracing::error!("failed to create action: {e}");
        let status = match e {
            ActionError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ActionError::NotFound(_) => StatusCode::NOT_FOUND,
            ActionError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": e.to_string() })))
    })
}

async fn get_action(
    State(service): State<ActionService>,
    Path(code): Path<String>,
) -> Result<Json<Action>, StatusCode> {
    service
        .get_by_code(&code)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_action(
    State(service): State<ActionService>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    service
        .soft_delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
