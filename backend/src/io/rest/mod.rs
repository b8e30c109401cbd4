//! # REST API Interface Layer
//!
//! HTTP endpoints for the family rewards backend, all mounted under `/api`.
//!
//! - **Children** ([`child_apis`]): profiles, balances, affordable rewards
//! - **Tasks** ([`task_apis`]): task CRUD and the completion / approval flow
//! - **Rewards** ([`reward_apis`]): the catalog and redemption requests
//! - **Family** ([`family_apis`]): family profile, approval queue, export
//!
//! Domain errors are translated in one place ([`error_response`]) so every
//! endpoint reports failures with the same JSON shape:
//! `{"error": "<message>", "code": "<CODE>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::json;
use shared::MutationResponse;
use tracing::{error, warn};

use crate::domain::{FamilyError, Transition};
use crate::AppState;

pub mod child_apis;
pub mod family_apis;
pub mod reward_apis;
pub mod task_apis;

/// All API routes, relative to `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/children", child_apis::router())
        .nest("/tasks", task_apis::router())
        .merge(reward_apis::router())
        .merge(family_apis::router())
}

/// Map a domain error to a status code and JSON body.
pub fn error_response(action: &str, e: FamilyError) -> Response {
    let (status, code) = match &e {
        e if e.is_not_found() => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        FamilyError::InsufficientPoints { .. } => (StatusCode::BAD_REQUEST, "INSUFFICIENT_POINTS"),
        FamilyError::MaxChildrenExceeded(_) => (StatusCode::BAD_REQUEST, "MAX_CHILDREN_EXCEEDED"),
        FamilyError::RewardUnavailable(_) => (StatusCode::BAD_REQUEST, "REWARD_UNAVAILABLE"),
        FamilyError::TaskNotAssigned { .. } => (StatusCode::BAD_REQUEST, "TASK_NOT_ASSIGNED"),
        FamilyError::Validation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
    };

    if status.is_server_error() {
        error!("Failed to {}: {}", action, e);
    } else {
        warn!("Failed to {}: {}", action, e);
    }

    let body = json!({
        "error": e.to_string(),
        "code": code,
    });
    (status, Json(body)).into_response()
}

/// 200 with a [`MutationResponse`]; `applied` is false for no-op calls.
pub fn mutation_response(transition: Transition, applied: &str, ignored: &str) -> Response {
    let message = match transition {
        Transition::Applied => applied,
        Transition::Ignored => ignored,
    };
    let response = MutationResponse {
        applied: transition.is_applied(),
        success_message: message.to_string(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
