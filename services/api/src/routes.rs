//! Task API routes

use auth::{AuthUser, require_bearer};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use axum_extra::extract::WithRejection;
use common::models::{MessageResponse, NewTask, UpdateTask};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    config::ServerConfig,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Create the router for the task API
///
/// `/api/auth/*` is public; `/api/tasks/*` requires a bearer token.
pub fn create_router(state: AppState) -> Router {
    let task_routes = Router::new()
        .route("/", get(list_tasks).post(create_task))
        .route("/:id", put(update_task).delete(delete_task))
        .route_layer(middleware::from_fn_with_state(
            state.auth.jwt_service.clone(),
            require_bearer,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/tasks", task_routes)
        .with_state(state.clone())
        .nest("/api/auth", auth::create_router(state.auth))
}

/// The router with CORS and request tracing, as served by the binary
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    create_router(state)
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = match config
        .cors_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => AllowOrigin::exact(origin),
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or_else(|e| {
            error!("Database health check failed: {}", e);
            false
        });

    Json(json!({
        "status": "ok",
        "service": "task-api",
        "database": database,
    }))
}

/// Create a task owned by the caller
pub async fn create_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    WithRejection(Json(mut payload), _): WithRejection<Json<NewTask>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    payload.title = payload.title.trim().to_string();
    if payload.title.is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    let task = state
        .task_repository
        .create(user.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to create task: {}", e);
            ApiError::internal("Error creating task", e)
        })?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get all tasks owned by the caller
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let tasks = state
        .task_repository
        .list_for_user(user.id)
        .await
        .map_err(|e| {
            error!("Failed to fetch tasks: {}", e);
            ApiError::internal("Error fetching tasks", e)
        })?;

    info!("Fetched {} tasks for user {}", tasks.len(), user.id);

    Ok(Json(tasks))
}

/// Apply a partial update to a task owned by the caller
pub async fn update_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    WithRejection(Json(mut payload), _): WithRejection<Json<UpdateTask>, ApiError>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_task_id(&id)?;

    if let Some(title) = payload.title.as_mut() {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Err(ApiError::BadRequest("Title must not be empty".to_string()));
        }
    }

    let task = state
        .task_repository
        .update_owned(id, user.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update task {}: {}", id, e);
            ApiError::internal("Error updating task", e)
        })?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(task))
}

/// Delete a task owned by the caller
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_task_id(&id)?;

    let deleted = state
        .task_repository
        .delete_owned(id, user.id)
        .await
        .map_err(|e| {
            error!("Failed to delete task {}: {}", id, e);
            ApiError::internal("Error deleting task", e)
        })?;

    if deleted {
        Ok(Json(MessageResponse::new("Task deleted")))
    } else {
        Err(ApiError::NotFound)
    }
}

/// An id that is not a UUID cannot name a task the caller owns.
fn parse_task_id(raw: &str) -> ApiResult<Uuid> {
    raw.parse().map_err(|_| {
        warn!("Malformed task id: {}", raw);
        ApiError::NotFound
    })
}
