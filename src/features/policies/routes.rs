use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use super::admin::{PolicyAdmin, PolicyAdminError};
use super::models::{CreateConditionInput, CreatePolicyInput, UpdatePolicyInput};

pub fn policy_routes() -> Router<PolicyAdmin> {
    Router::new()
        .route("/", get(list_policies).post(create_policy))
        .route(
            "/:id",
            get(get_policy).patch(update_policy).delete(delete_policy),
        )
        .route("/:id/conditions", post(add_condition))
        .route("/:id/actions/:action_id", post(bind_action).delete(unbind_action))
}

impl From<&PolicyAdminError> for StatusCode {
    fn from(err: &PolicyAdminError) -> Self {
        match err {
            PolicyAdminError::NotFound(_) => StatusCode::NOT_FOUND,
            PolicyAdminError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            PolicyAdminError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

async fn list_policies(State(admin): State<PolicyAdmin>) -> Result<Json<serde_json::Value>, StatusCode> {
    let rows = admin.list_policies().await.map_err(|err| {
        tracing::error!(?err, "failed to list policies");
        StatusCode::from(&err)
    })?;
    Ok(Json(serde_json::json!(rows)))
}

async fn get_policy(
    State(admin): State<PolicyAdmin>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let policy = admin.get_policy(id).await.map_err(|err| {
        if !matches!(err, PolicyAdminError::NotFound(_)) {
            tracing::error!(?err, "failed to fetch policy");
        }
        StatusCode::from(&err)
    })?;
    Ok(Json(serde_json::json!(policy)))
}

async fn create_policy(
    State(admin): State<PolicyAdmin>,
    Json(input): Json<CreatePolicyInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let policy = admin.create_policy(input).await.map_err(|err| {
        tracing::error!(?err, "failed to create policy");
        StatusCode::from(&err)
    })?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(policy))))
}

async fn update_policy(
    State(admin): State<PolicyAdmin>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePolicyInput>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let policy = admin.update_policy(id, input).await.map_err(|err| {
        if !matches!(err, PolicyAdminError::NotFound(_)) {
            tracing::error!(?err, "failed to update policy");
        }
        StatusCode::from(&err)
    })?;
    Ok(Json(serde_json::json!(policy)))
}

async fn delete_policy(
    State(admin): State<PolicyAdmin>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    admin.delete_policy(id).await.map_err(|err| {
        if !matches!(err, PolicyAdminError::NotFound(_)) {
            tracing::error!(?err, "failed to delete policy");
        }
        StatusCode::from(&err)
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_condition(
    State(admin): State<PolicyAdmin>,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateConditionInput>,
) -> Result<(StatusCode, Json<serde_json::Value>), StatusCode> {
    let condition = admin.add_condition(id, input).await.map_err(|err| {
        tracing::error!(?err, "failed to add condition");
        StatusCode::from(&err)
    })?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(condition))))
}

async fn bind_action(
    State(admin): State<PolicyAdmin>,
    Path((policy_id, action_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    admin.bind_action(policy_id, action_id).await.map_err(|err| {
        tracing::error!(?err, "failed to bind action");
        StatusCode::from(&err)
    })?;
    Ok(StatusCode::NO_CONTENT)
}

async fn unbind_action(
    State(admin): State<PolicyAdmin>,
    Path((policy_id, action_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, StatusCode> {
    admin.unbind_action(policy_id, action_id).await.map_err(|err| {
        tracing::error!(?err, "failed to unbind action");
        StatusCode::from(&err)
    })?;
    Ok(StatusCode::NO_CONTENT)
}
