//! # REST API for Tasks
//!
//! Task CRUD plus the completion flow: a child marks a task done, a parent
//! approves (crediting the points) or rejects it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use tracing::info;

use super::{error_response, mutation_response};
use crate::AppState;
use shared::{
    ChildActionRequest, CreateTaskRequest, ParentDecisionRequest, TaskListResponse, TaskResponse,
    UpdateTaskRequest,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", put(update_task).delete(delete_task))
        .route("/:id/complete", post(complete_task))
        .route("/:id/approve", post(approve_task))
        .route("/:id/reject", post(reject_task))
        .route("/:id/reassign", post(reassign_task))
}

pub async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/tasks");

    let store = state.store.lock().await;
    let tasks = store.state().tasks().to_vec();
    (StatusCode::OK, Json(TaskListResponse { tasks })).into_response()
}

pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks - request: {:?}", request);

    let mut store = state.store.lock().await;
    match store.add_task(request).await {
        Ok(task) => {
            let response = TaskResponse {
                success_message: format!("Task '{}' added", task.title),
                task,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(e) => error_response("create task", e),
    }
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> impl IntoResponse {
    info!("PUT /api/tasks/{} - request: {:?}", task_id, request);

    let mut store = state.store.lock().await;
    match store.update_task(&task_id, request).await {
        Ok(task) => {
            let response = TaskResponse {
                success_message: format!("Task '{}' updated", task.title),
                task,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("update task", e),
    }
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/tasks/{}", task_id);

    let mut store = state.store.lock().await;
    match store.delete_task(&task_id).await {
        Ok(_) => (StatusCode::NO_CONTENT, "").into_response(),
        Err(e) => error_response("delete task", e),
    }
}

/// Child marks a task done; points become pending credit
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<ChildActionRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/complete - child: {}", task_id, request.child_id);

    let mut store = state.store.lock().await;
    match store.complete_task(&task_id, &request.child_id).await {
        Ok(transition) => mutation_response(
            transition,
            "Task completed, waiting for approval",
            "Task was already completed",
        ),
        Err(e) => error_response("complete task", e),
    }
}

pub async fn approve_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<ParentDecisionRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/approve - parent: {}", task_id, request.parent_id);

    let mut store = state.store.lock().await;
    match store.approve_task_completion(&task_id, &request.parent_id).await {
        Ok(transition) => mutation_response(
            transition,
            "Task approved, points credited",
            "Task is not awaiting approval",
        ),
        Err(e) => error_response("approve task", e),
    }
}

pub async fn reject_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<ParentDecisionRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/reject - parent: {}", task_id, request.parent_id);

    let mut store = state.store.lock().await;
    match store.reject_task_completion(&task_id, &request.parent_id).await {
        Ok(transition) => mutation_response(
            transition,
            "Task sent back to the child",
            "Task is not awaiting approval",
        ),
        Err(e) => error_response("reject task", e),
    }
}

pub async fn reassign_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<ChildActionRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/reassign - child: {}", task_id, request.child_id);

    let mut store = state.store.lock().await;
    match store.reassign_task(&task_id, &request.child_id).await {
        Ok(transition) => mutation_response(
            transition,
            "Task reassigned",
            "Task is already assigned to this child",
        ),
        Err(e) => error_response("reassign task", e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{read_json, send, setup_test_app};
    use axum::http::{Method, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use shared::{BalanceResponse, ChildResponse, MutationResponse, TaskListResponse, TaskResponse};

    async fn create_child(app: &Router, name: &str) -> String {
        let response = send(
            app,
            Method::POST,
            "/api/children",
            Some(json!({ "name": name, "age": 8 })),
        )
        .await;
        let created: ChildResponse = read_json(response).await;
        created.child.id
    }

    async fn create_task(app: &Router, child_id: &str, points: u32) -> String {
        let response = send(
            app,
            Method::POST,
            "/api/tasks",
            Some(json!({
                "childId": child_id,
                "title": "Make the bed",
                "category": "chores",
                "points": points,
                "difficulty": "easy"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: TaskResponse = read_json(response).await;
        created.task.id
    }

    async fn balance(app: &Router, child_id: &str) -> BalanceResponse {
        let response = send(app, Method::GET, &format!("/api/children/{}/balance", child_id), None).await;
        read_json(response).await
    }

    #[tokio::test]
    async fn test_complete_and_approve_flow() {
        let app = setup_test_app().await;
        let child_id = create_child(&app, "Ava").await;
        let task_id = create_task(&app, &child_id, 15).await;

        let response = send(
            &app,
            Method::POST,
            &format!("/api/tasks/{}/complete", task_id),
            Some(json!({ "childId": child_id })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let result: MutationResponse = read_json(response).await;
        assert!(result.applied);

        let pending = balance(&app, &child_id).await;
        assert_eq!(pending.settled_points, 0);
        assert_eq!(pending.pending_credit, 15);
        assert_eq!(pending.remaining, 15);

        let approve_uri = format!("/api/tasks/{}/approve", task_id);
        let response = send(&app, Method::POST, &approve_uri, Some(json!({ "parentId": "parent_1" }))).await;
        let result: MutationResponse = read_json(response).await;
        assert!(result.applied);

        let response = send(&app, Method::POST, &approve_uri, Some(json!({ "parentId": "parent_1" }))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let result: MutationResponse = read_json(response).await;
        assert!(!result.applied);

        let settled = balance(&app, &child_id).await;
        assert_eq!(settled.settled_points, 15);
        assert_eq!(settled.pending_credit, 0);
        assert_eq!(settled.remaining, 15);
    }

    #[tokio::test]
    async fn test_complete_by_wrong_child_is_rejected() {
        let app = setup_test_app().await;
        let ava = create_child(&app, "Ava").await;
        let ben = create_child(&app, "Ben").await;
        let task_id = create_task(&app, &ava, 5).await;

        let response = send(
            &app,
            Method::POST,
            &format!("/api/tasks/{}/complete", task_id),
            Some(json!({ "childId": ben })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_json(response).await;
        assert_eq!(body["code"], "TASK_NOT_ASSIGNED");
    }

    #[tokio::test]
    async fn test_create_task_for_unknown_child() {
        let app = setup_test_app().await;
        let response = send(
            &app,
            Method::POST,
            "/api/tasks",
            Some(json!({
                "childId": "child::1::missing",
                "title": "Homework",
                "category": "homework",
                "points": 10,
                "difficulty": "medium"
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reassign_and_delete() {
        let app = setup_test_app().await;
        let ava = create_child(&app, "Ava").await;
        let ben = create_child(&app, "Ben").await;
        let task_id = create_task(&app, &ava, 5).await;

        let response = send(
            &app,
            Method::POST,
            &format!("/api/tasks/{}/reassign", task_id),
            Some(json!({ "childId": ben })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, Method::GET, &format!("/api/children/{}/tasks", ben), None).await;
        let tasks: TaskListResponse = read_json(response).await;
        assert_eq!(tasks.tasks.len(), 1);

        let response = send(&app, Method::DELETE, &format!("/api/tasks/{}", task_id), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, Method::GET, "/api/tasks", None).await;
        let tasks: TaskListResponse = read_json(response).await;
        assert!(tasks.tasks.is_empty());

        let response = send(&app, Method::DELETE, &format!("/api/tasks/{}", task_id), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_points_on_approved_task() {
        let app = setup_test_app().await;
        let child_id = create_child(&app, "Ava").await;
        let task_id = create_task(&app, &child_id, 10).await;

        send(
            &app,
            Method::POST,
            &format!("/api/tasks/{}/complete", task_id),
            Some(json!({ "childId": child_id })),
        )
        .await;
        send(
            &app,
            Method::POST,
            &format!("/api/tasks/{}/approve", task_id),
            Some(json!({ "parentId": "parent_1" })),
        )
        .await;

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/tasks/{}", task_id),
            Some(json!({ "points": 50 })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(
            &app,
            Method::PUT,
            &format!("/api/tasks/{}", task_id),
            Some(json!({ "title": "Make the bed properly" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: TaskResponse = read_json(response).await;
        assert_eq!(updated.task.title, "Make the bed properly");
        assert_eq!(updated.task.points, 10);
    }
}
