use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::models::{AssignSubjectAttributeInput, SetResourceAttributeInput};
use super::store::AttributeStore;

pub fn attribute_routes() -> Router<AttributeStore> {
    Router::new()
        .route("/subjects/:subject_id", get(get_subject_attributes))
        .route("/subjects", post(assign_subject_attribute))
        .route("/subjects/:subject_id/:attribute_key", axum::routing::delete(revoke_subject_attribute))
        .route("/resources/:resource_id", get(get_resource_attributes))
        .route("/resources", post(set_resource_attribute))
        .route("/resources/:resource_id/:attribute_key", axum::routing::delete(clear_resource_attribute))
}

#[derive(Deserialize)]
struct AtQuery {
    at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn get_subject_attributes(
    State(store): State<AttributeStore>,
    Path(subject_id): Path<Uuid>,
    Query(q): Query<AtQuery>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let at = q.at.unwrap_or_else(chrono::Utc::now);
    let bag = store
        .get_active_subject_attributes(subject_id, at)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(bag_to_json(&bag)))
}

async fn get_resource_attributes(
    State(store): State<AttributeStore>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let bag = store
        .get_resource_attributes(resource_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(bag_to_json(&bag)))
}

async fn assign_subject_attribute(
    State(store): State<AttributeStore>,
    Json(input): Json<AssignSubjectAttributeInput>,
) -> Result<StatusCode, StatusCode> {
    store
        .assign_subject_attribute(input)
        .await
        .map(|_| StatusCode::CREATED)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn revoke_subject_attribute(
    State(store): State<AttributeStore>,
    Path((subject_id, attribute_key)): Path<(Uuid, String)>,
) -> Result<StatusCode, StatusCode> {
    store
        .revoke_subject_attribute(subject_id, &attribute_key)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn set_resource_attribute(
    State(store): State<AttributeStore>,
    Json(input): Json<SetResourceAttributeInput>,
) -> Result<StatusCode, StatusCode> {
    store
        .set_resource_attribute(input)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

async fn clear_resource_attribute(
    State(store): State<AttributeStore>,
    Path((resource_id, attribute_key)): Path<(Uuid, String)>,
) -> Result<StatusCode, StatusCode> {
    store
        .clear_resource_attribute(resource_id, &attribute_key)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

fn bag_to_json(bag: &crate::features::evaluation::condition::AttributeBag) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (key, value) in bag {
        let v = match value {
            Ok(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
            Err(reason) => serde_json::json!({ "error": reason }),
        };
        map.insert(key.clone(), v);
    }
    serde_json::Value::Object(map)
}
