//! Training schedule API routes
//!
//! `:week` is the 1-based week number and `:index` the 0-based position
//! within that week.

use super::{export, parse_id, share};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::{Caller, ScheduleService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use mile_planner_shared::types::{
    CompleteWorkoutRequest, CompletionResponse, CreateScheduleRequest, MoveWorkoutRequest,
    PlacementResponse, ScheduleDetail, ScheduleSummary, UpdateMileageRequest, UpdateScheduleRequest,
};
use mile_planner_shared::{SchedulePermissions, TransferPayload};

/// Create schedule routes
pub fn schedule_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_schedules).post(create_schedule))
        .route(
            "/:id",
            get(get_schedule).put(update_schedule).delete(delete_schedule),
        )
        .route("/:id/permissions", get(get_permissions))
        .route("/:id/export", get(export::export_schedule))
        .route("/:id/weeks/:week/workouts", post(place_workout))
        .route("/:id/weeks/:week/workouts/:index", delete(remove_workout))
        .route("/:id/weeks/:week/workouts/:index/duplicate", post(duplicate_workout))
        .route("/:id/weeks/:week/workouts/:index/move", post(move_workout))
        .route("/:id/weeks/:week/workouts/:index/complete", post(complete_workout))
        .route("/:id/weeks/:week/mileage", put(update_mileage))
        .merge(share::share_routes())
}

/// GET /api/v1/schedules - Own schedules and those shared with the caller
async fn list_schedules(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<ScheduleSummary>>, ApiError> {
    Ok(Json(ScheduleService::list(state.db(), auth.account_id).await?))
}

/// POST /api/v1/schedules - Create a schedule with twelve empty weeks
async fn create_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<Json<ScheduleDetail>, ApiError> {
    let caller = Caller {
        account_id: auth.account_id,
        email: auth.email.as_deref(),
    };
    let detail = ScheduleService::create(state.db(), state.cache(), caller, req).await?;
    Ok(Json(detail))
}

async fn get_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ScheduleDetail>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let detail = ScheduleService::get(state.db(), state.cache(), schedule_id, auth.account_id).await?;
    Ok(Json(detail))
}

/// PUT /api/v1/schedules/:id - Rename or change the start date
async fn update_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Result<Json<ScheduleDetail>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let detail =
        ScheduleService::update_header(state.db(), state.cache(), schedule_id, auth.account_id, req)
            .await?;
    Ok(Json(detail))
}

async fn delete_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    ScheduleService::delete(state.db(), schedule_id, auth.account_id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

/// GET /api/v1/schedules/:id/permissions - What the caller may do here
async fn get_permissions(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SchedulePermissions>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let (_, permissions) =
        ScheduleService::permissions(state.db(), schedule_id, auth.account_id).await?;
    Ok(Json(permissions))
}

/// POST /api/v1/schedules/:id/weeks/:week/workouts - Drop a catalog workout into a week
async fn place_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, week)): Path<(String, u32)>,
    Json(payload): Json<TransferPayload>,
) -> Result<Json<PlacementResponse>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let placed = ScheduleService::place(
        state.db(),
        state.cache(),
        schedule_id,
        auth.account_id,
        week,
        payload,
    )
    .await?;
    Ok(Json(placed))
}

async fn remove_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, week, index)): Path<(String, u32, usize)>,
) -> Result<Json<ScheduleDetail>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let detail = ScheduleService::remove(
        state.db(),
        state.cache(),
        schedule_id,
        auth.account_id,
        week,
        index,
    )
    .await?;
    Ok(Json(detail))
}

/// POST .../workouts/:index/duplicate - Insert a fresh copy right after the original
async fn duplicate_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, week, index)): Path<(String, u32, usize)>,
) -> Result<Json<PlacementResponse>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let placed = ScheduleService::duplicate(
        state.db(),
        state.cache(),
        schedule_id,
        auth.account_id,
        week,
        index,
    )
    .await?;
    Ok(Json(placed))
}

async fn move_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, week, index)): Path<(String, u32, usize)>,
    Json(req): Json<MoveWorkoutRequest>,
) -> Result<Json<PlacementResponse>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let placed = ScheduleService::move_workout(
        state.db(),
        state.cache(),
        schedule_id,
        auth.account_id,
        week,
        index,
        req.to_week,
        req.to_index,
    )
    .await?;
    Ok(Json(placed))
}

/// POST .../workouts/:index/complete - Mark done and log the performance
async fn complete_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, week, index)): Path<(String, u32, usize)>,
    Json(req): Json<CompleteWorkoutRequest>,
) -> Result<Json<CompletionResponse>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let caller = Caller {
        account_id: auth.account_id,
        email: auth.email.as_deref(),
    };
    let completed = ScheduleService::complete(
        state.db(),
        state.cache(),
        state.config().planner.completion_policy,
        schedule_id,
        caller,
        week,
        index,
        req.into(),
    )
    .await?;
    Ok(Json(completed))
}

/// PUT /api/v1/schedules/:id/weeks/:week/mileage - Edit the goal or actual mileage text
async fn update_mileage(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, week)): Path<(String, u32)>,
    Json(req): Json<UpdateMileageRequest>,
) -> Result<Json<ScheduleDetail>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let detail = ScheduleService::update_mileage(
        state.db(),
        state.cache(),
        schedule_id,
        auth.account_id,
        week,
        req.field,
        &req.value,
    )
    .await?;
    Ok(Json(detail))
}
