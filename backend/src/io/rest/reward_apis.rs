//! # REST API for Rewards and Redemptions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::info;

use super::{error_response, mutation_response};
use crate::AppState;
use shared::{
    CreateRewardRequest, ParentDecisionRequest, RedemptionListResponse, RedemptionRequest,
    RedemptionResponse, RedemptionStatus, RewardListResponse, RewardResponse,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rewards", get(list_rewards).post(create_reward))
        .route("/redemptions", get(list_redemptions).post(request_redemption))
        .route("/redemptions/:id/approve", post(approve_redemption))
        .route("/redemptions/:id/reject", post(reject_redemption))
}

pub async fn list_rewards(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/rewards");

    let store = state.store.lock().await;
    let rewards = store.state().rewards().to_vec();
    (StatusCode::OK, Json(RewardListResponse { rewards })).into_response()
}

pub async fn create_reward(
    State(state): State<AppState>,
    Json(request): Json<CreateRewardRequest>,
) -> impl IntoResponse {
    info!("POST /api/rewards - request: {:?}", request);

    let mut store = state.store.lock().await;
    match store.add_reward(request).await {
        Ok(reward) => {
            let response = RewardResponse {
                success_message: format!("Reward '{}' added", reward.title),
                reward,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create reward", e),
    }
}

/// Query parameters for the redemption history endpoint
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionListQuery {
    pub status: Option<RedemptionStatus>,
    pub child_id: Option<String>,
}

pub async fn list_redemptions(
    State(state): State<AppState>,
    Query(query): Query<RedemptionListQuery>,
) -> impl IntoResponse {
    info!("GET /api/redemptions - query: {:?}", query);

    let store = state.store.lock().await;
    let redemptions = store.redemption_history(query.child_id.as_deref(), query.status);
    (StatusCode::OK, Json(RedemptionListResponse { redemptions })).into_response()
}

/// Child asks to spend points; the cost is escrowed until a parent decides
pub async fn request_redemption(
    State(state): State<AppState>,
    Json(request): Json<RedemptionRequest>,
) -> impl IntoResponse {
    info!("POST /api/redemptions - request: {:?}", request);

    let mut store = state.store.lock().await;
    match store.request_redemption(&request.reward_id, &request.child_id).await {
        Ok(redemption) => {
            let response = RedemptionResponse {
                success_message: "Request sent to your parents".to_string(),
                redemption,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("request redemption", e),
    }
}

pub async fn approve_redemption(
    State(state): State<AppState>,
    Path(redemption_id): Path<String>,
    Json(request): Json<ParentDecisionRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/redemptions/{}/approve - parent: {}",
        redemption_id, request.parent_id
    );

    let mut store = state.store.lock().await;
    match store.approve_redemption(&redemption_id, &request.parent_id).await {
        Ok(transition) => mutation_response(
            transition,
            "Redemption approved, points deducted",
            "Redemption was already decided",
        ),
        Err(e) => error_response("approve redemption", e),
    }
}

pub async fn reject_redemption(
    State(state): State<AppState>,
    Path(redemption_id): Path<String>,
    Json(request): Json<ParentDecisionRequest>,
) -> impl IntoResponse {
    info!(
        "POST /api/redemptions/{}/reject - parent: {}",
        redemption_id, request.parent_id
    );

    let mut store = state.store.lock().await;
    match store.reject_redemption(&redemption_id, &request.parent_id).await {
        Ok(transition) => mutation_response(
            transition,
            "Redemption rejected, points released",
            "Redemption was already decided",
        ),
        Err(e) => error_response("reject redemption", e),
    }
}
