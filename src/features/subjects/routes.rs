use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::service::SubjectService;
use crate::domain::Subject;

pub fn subject_routes() -> Router<SubjectService> {
    Router::new()
        .route("/", get(list_subjects).post(create_subject))
        .route("/:id", get(get_subject).delete(delete_subject))
}

async fn list_subjects(State(service): State<SubjectService>) -> Result<Json<Vec<Subject>>, StatusCode> {
    service
        .list_subjects()
        .await
        .map(Json)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn create_subject(
    State(service): State<SubjectService>,
) -> Result<(StatusCode, Json<Subject>), StatusCode> {
    service
        .create_subject()
        .await
        .map(|s| (StatusCode::CREATED, Json(s)))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn get_subject(
    State(service): State<SubjectService>,
    Path(id): Path<Uuid>,
) -> Result<Json<Subject>, StatusCode> {
    service
        .get(id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn delete_subject(
    State(service): State<SubjectService>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    service
        .soft_delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
