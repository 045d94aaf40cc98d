//! Markdown download handlers

use super::parse_id;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::services::{ExportService, MarkdownExport};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue},
    response::IntoResponse,
};

fn attachment(export: MarkdownExport) -> Result<impl IntoResponse, ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/markdown; charset=utf-8"),
    );
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", export.file_name))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid export file name: {}", e)))?;
    headers.insert(header::CONTENT_DISPOSITION, disposition);

    Ok((headers, export.body))
}

/// GET /api/v1/schedules/:id/export - Schedule as a markdown file
pub(super) async fn export_schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let schedule_id = parse_id(&id, "schedule")?;
    let export =
        ExportService::schedule_markdown(state.db(), state.cache(), schedule_id, auth.account_id).await?;
    attachment(export)
}

/// GET /api/v1/history/export - Journal as a markdown file
pub(super) async fn export_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let export = ExportService::history_markdown(state.db(), state.cache(), auth.account_id).await?;
    attachment(export)
}
