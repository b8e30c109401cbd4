//! # REST API for Child Management
//!
//! Endpoints for creating, updating and removing children, plus the
//! per-child balance and affordable-reward views.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tracing::info;

use super::error_response;
use crate::domain::FamilyError;
use crate::AppState;
use shared::{
    BalanceResponse, ChildListResponse, ChildResponse, CreateChildRequest, RewardListResponse,
    TaskListResponse, UpdateChildRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_children).post(create_child))
        .route("/:id", get(get_child).put(update_child).delete(delete_child))
        .route("/:id/balance", get(get_balance))
        .route("/:id/tasks", get(list_child_tasks))
        .route("/:id/rewards", get(list_affordable_rewards))
}

/// List all children
pub async fn list_children(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/children");

    let store = state.store.lock().await;
    let children = store.state().children().to_vec();
    info!("Found {} children", children.len());
    (StatusCode::OK, Json(ChildListResponse { children })).into_response()
}

/// Create a new child
pub async fn create_child(
    State(state): State<AppState>,
    Json(request): Json<CreateChildRequest>,
) -> impl IntoResponse {
    info!("POST /api/children - request: {:?}", request);

    let mut store = state.store.lock().await;
    match store.add_child(request).await {
        Ok(child) => {
            let response = ChildResponse {
                success_message: format!("Added {}", child.name),
                child,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create child", e),
    }
}

/// Get a child by ID
pub async fn get_child(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/children/{}", child_id);

    let store = state.store.lock().await;
    match store.child(&child_id) {
        Some(child) => (StatusCode::OK, Json(child.clone())).into_response(),
        None => error_response("get child", FamilyError::ChildNotFound(child_id)),
    }
}

/// Update a child's profile
pub async fn update_child(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
    Json(request): Json<UpdateChildRequest>,
) -> impl IntoResponse {
    info!("PUT /api/children/{} - request: {:?}", child_id, request);

    let mut store = state.store.lock().await;
    match store.update_child(&child_id, request).await {
        Ok(child) => {
            let response = ChildResponse {
                success_message: format!("Updated {}", child.name),
                child,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("update child", e),
    }
}

/// Remove a child. Their tasks and redemptions are kept.
pub async fn delete_child(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/children/{}", child_id);

    let mut store = state.store.lock().await;
    match store.remove_child(&child_id).await {
        Ok(_) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => error_response("delete child", e),
    }
}

pub async fn get_balance(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/balance", child_id);

    let store = state.store.lock().await;
    match store.point_balance(&child_id) {
        Ok(balance) => {
            let response = BalanceResponse {
                child_id,
                settled_points: balance.settled,
                pending_credit: balance.pending_credit,
                pending_debit: balance.pending_debit,
                remaining: balance.remaining(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("get balance", e),
    }
}

pub async fn list_child_tasks(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/tasks", child_id);

    let store = state.store.lock().await;
    if store.child(&child_id).is_none() {
        return error_response("list tasks", FamilyError::ChildNotFound(child_id));
    }
    let tasks = store.tasks_for_child(&child_id);
    (StatusCode::OK, Json(TaskListResponse { tasks })).into_response()
}

/// Rewards the child can request right now
pub async fn list_affordable_rewards(
    State(state): State<AppState>,
    Path(child_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/children/{}/rewards", child_id);

    let store = state.store.lock().await;
    match store.available_rewards(&child_id) {
        Ok(rewards) => (StatusCode::OK, Json(RewardListResponse { rewards })).into_response(),
        Err(e) => error_response("list affordable rewards", e),
    }
}
