use axum::{
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

use crate::features::environment::RequestContext;

use super::dto::{CheckAccessRequest, CheckAccessResponse};
use super::error::AccessControlError;
use super::facade::AccessControlFacade;

pub fn access_control_routes() -> Router<AccessControlFacade> {
    Router::new().route("/evaluate", post(evaluate))
}

impl From<&AccessControlError> for StatusCode {
    fn from(err: &AccessControlError) -> Self {
        match err {
            AccessControlError::ResourceNotFound => StatusCode::NOT_FOUND,
            AccessControlError::EvaluationTimeout => StatusCode::GATEWAY_TIMEOUT,
            AccessControlError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AccessControlError::AuditWriteError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

async fn evaluate(
    State(facade): State<AccessControlFacade>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(req): Json<CheckAccessRequest>,
) -> Result<Json<CheckAccessResponse>, (StatusCode, Json<serde_json::Value>)> {
    let ctx = RequestContext {
        ip_address: Some(addr.ip().to_string()),
        request_method: Some("POST".to_string()),
        request_path: Some("/access/evaluate".to_string()),
        user_agent: headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };

    let response = facade
        .check_access(
            req.subject_id,
            req.resource_id,
            req.action_id,
            req.environment,
            ctx,
            CancellationToken::new(),
        )
        .await
        .map_err(|err| {
            tracing::error!(?err, "access evaluation failed");
            let status = StatusCode::from(&err);
            (status, Json(serde_json::json!({ "error": err.to_string() })))
        })?;

    Ok(Json(response))
}
