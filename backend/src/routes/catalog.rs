//! Workout catalog API routes

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use mile_planner_shared::reconcile::AnnotatedCategory;
use mile_planner_shared::types::UpdateWorkoutRequest;
use mile_planner_shared::{NewWorkout, WorkoutDefinition, WorkoutVersion};

/// Create catalog routes
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_catalog))
        .route("/workouts", post(create_workout))
        .route(
            "/workouts/:id",
            get(get_workout).put(update_workout).delete(delete_workout),
        )
        .route("/workouts/:id/versions", get(get_versions))
}

/// GET /api/v1/catalog - Workouts grouped by category with last performance
async fn get_catalog(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<AnnotatedCategory>>, ApiError> {
    let catalog = CatalogService::annotated(state.db(), state.cache(), auth.account_id).await?;
    Ok(Json(catalog))
}

/// POST /api/v1/catalog/workouts - Add a custom workout
async fn create_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewWorkout>,
) -> Result<Json<WorkoutDefinition>, ApiError> {
    let workout = CatalogService::create_workout(
        state.db(),
        state.cache(),
        auth.account_id,
        auth.email.as_deref(),
        req,
    )
    .await?;
    Ok(Json(workout))
}

async fn get_workout(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<WorkoutDefinition>, ApiError> {
    Ok(Json(CatalogService::get_workout(state.db(), &id).await?))
}

/// PUT /api/v1/catalog/workouts/:id - Edit a custom workout, snapshotting the prior version
async fn update_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateWorkoutRequest>,
) -> Result<Json<WorkoutDefinition>, ApiError> {
    let workout =
        CatalogService::update_workout(state.db(), state.cache(), auth.account_id, &id, req).await?;
    Ok(Json(workout))
}

/// DELETE /api/v1/catalog/workouts/:id - Refused while the workout is scheduled
async fn delete_workout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    CatalogService::delete_workout(state.db(), state.cache(), auth.account_id, &id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}

async fn get_versions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<WorkoutVersion>>, ApiError> {
    Ok(Json(CatalogService::versions(state.db(), &id).await?))
}
