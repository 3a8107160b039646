use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::models::CreateResourceInput;
use super::service::ResourceService;
use crate::domain::Resource;

pub fn resource_routes() -> Router<ResourceService> {
    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route("/:id", get(get_resource).delete(delete_resource))
}

async fn list_resources(State(service): State<ResourceService>) -> Result<Json<Vec<Resource>>, StatusCode> {
    service
        .list_resources()
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_resource(
    State(service): State<ResourceService>,
    Json(input): Json<CreateResourceInput>,
) -> Result<(StatusCode, Json<Resource>), StatusCode> {
    service
        .create_resource(input)
        .await
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn get_resource(
    State(service): State<ResourceService>,
    Path(id): Path<Uuid>,
) -> Result<Json<Resource>, StatusCode> {
    service
        .get(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_resource(
    State(service): State<ResourceService>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    service
        .soft_delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
