//! # REST API for the Family Profile, Approval Queue and Export

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use super::error_response;
use crate::AppState;
use shared::PendingApprovalsResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/family", get(get_family))
        .route("/approvals/pending", get(pending_approvals))
        .route("/export", get(export_data))
}

pub async fn get_family(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/family");

    let store = state.store.lock().await;
    (StatusCode::OK, Json(store.state().family().clone())).into_response()
}

/// Counts for the parent's approval badge
pub async fn pending_approvals(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/approvals/pending");

    let store = state.store.lock().await;
    let (pending_tasks, pending_redemptions) = store.pending_approvals();
    let response = PendingApprovalsResponse {
        pending_tasks,
        pending_redemptions,
        total: pending_tasks + pending_redemptions,
    };
    (StatusCode::OK, Json(response)).into_response()
}

pub async fn export_data(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/export");

    let store = state.store.lock().await;
    match store.export_data() {
        Ok(json) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            json,
        )
            .into_response(),
        Err(e) => error_response("export data", e),
    }
}
