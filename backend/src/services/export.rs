//! Markdown export of schedules and workout history

use crate::cache::CatalogCache;
use crate::error::ApiError;
use crate::services::catalog::CatalogService;
use crate::services::history::HistoryService;
use crate::services::schedule::ScheduleService;
use crate::telemetry;
use chrono::Utc;
use mile_planner_shared::export::{
    export_file_name, history_to_markdown, schedule_to_markdown, HISTORY_EXPORT_FILE,
};
use sqlx::PgPool;
use uuid::Uuid;

/// A rendered document and the file name it should download as
#[derive(Debug, Clone)]
pub struct MarkdownExport {
    pub file_name: String,
    pub body: String,
}

pub struct ExportService;

impl ExportService {
    /// Export a schedule the account can view
    pub async fn schedule_markdown(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
    ) -> Result<MarkdownExport, ApiError> {
        let (record, permissions) = ScheduleService::permissions(pool, schedule_id, account_id).await?;
        if !permissions.can_view {
            return Err(ApiError::NotFound("Schedule not found".to_string()));
        }

        let (schedule, catalog, history) = tokio::join!(
            ScheduleService::load_schedule(pool, &record),
            CatalogService::load(pool, cache),
            HistoryService::load_log(pool, account_id),
        );
        let schedule = schedule?;

        telemetry::record_export("schedule");
        Ok(MarkdownExport {
            file_name: export_file_name(schedule.name()),
            body: schedule_to_markdown(&schedule, &catalog?, &history?, Utc::now().date_naive()),
        })
    }

    /// Export the account's whole journal
    pub async fn history_markdown(
        pool: &PgPool,
        cache: &CatalogCache,
        account_id: Uuid,
    ) -> Result<MarkdownExport, ApiError> {
        let (catalog, history) = tokio::join!(
            CatalogService::load(pool, cache),
            HistoryService::load_log(pool, account_id),
        );

        telemetry::record_export("history");
        Ok(MarkdownExport {
            file_name: HISTORY_EXPORT_FILE.to_string(),
            body: history_to_markdown(&history?, &catalog?, Utc::now().date_naive()),
        })
    }
}
