//! Workout history API routes

use super::{export, parse_id};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::HistoryService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use mile_planner_shared::types::{CreateHistoryRequest, UpdateHistoryRequest};
use mile_planner_shared::HistoryEntry;

/// Create history routes
pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_history).post(log_workout))
        .route("/export", get(export::export_history))
        .route("/:id", put(update_entry))
        .route("/workouts/:workout_id", get(history_for_workout))
        .route("/workouts/:workout_id/last", get(last_performance))
}

/// GET /api/v1/history - The caller's journal, newest first
async fn list_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    Ok(Json(HistoryService::list(state.db(), auth.account_id).await?))
}

/// POST /api/v1/history - Log a performance outside any schedule
async fn log_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateHistoryRequest>,
) -> Result<Json<HistoryEntry>, ApiError> {
    let entry = HistoryService::append(
        state.db(),
        state.cache(),
        auth.account_id,
        auth.email.as_deref(),
        req.into(),
    )
    .await?;
    Ok(Json(entry))
}

async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateHistoryRequest>,
) -> Result<Json<HistoryEntry>, ApiError> {
    let entry_id = parse_id(&id, "history entry")?;
    let entry = HistoryService::update(state.db(), auth.account_id, entry_id, req.into()).await?;
    Ok(Json(entry))
}

async fn history_for_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workout_id): Path<String>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let entries = HistoryService::for_workout(state.db(), auth.account_id, &workout_id).await?;
    Ok(Json(entries))
}

/// GET /api/v1/history/workouts/:workout_id/last - Most recent performance, or null
async fn last_performance(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(workout_id): Path<String>,
) -> Result<Json<Option<HistoryEntry>>, ApiError> {
    let entry = HistoryService::last_performance(state.db(), auth.account_id, &workout_id).await?;
    Ok(Json(entry))
}
