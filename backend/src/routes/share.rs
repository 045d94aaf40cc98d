//! Schedule sharing routes, mounted under `/schedules`

use super::parse_id;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::{Caller, ShareService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use mile_planner_shared::types::{ShareResponse, ShareScheduleRequest};

pub fn share_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/shares", get(list_shares).post(share_schedule))
        .route("/:id/shares/:share_id", delete(unshare_schedule))
}

/// POST /api/v1/schedules/:id/shares - Grant view or edit access by email
async fn share_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<ShareScheduleRequest>,
) -> Result<Json<ShareResponse>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let caller = Caller {
        account_id: auth.account_id,
        email: auth.email.as_deref(),
    };
    Ok(Json(ShareService::share(state.db(), schedule_id, caller, req).await?))
}

async fn list_shares(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<ShareResponse>>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    Ok(Json(ShareService::list(state.db(), schedule_id, auth.account_id).await?))
}

async fn unshare_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, share_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let share_id = parse_id(&share_id, "share")?;
    ShareService::unshare(state.db(), schedule_id, share_id, auth.account_id).await?;
    Ok(Json(serde_json::json!({"deleted": true})))
}
