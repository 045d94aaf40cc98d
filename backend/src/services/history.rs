//! Workout history service

use crate::cache::CatalogCache;
use crate::error::ApiError;
use crate::repositories::HistoryRepository;
use crate::services::catalog::CatalogService;
use crate::services::mirror_account;
use crate::telemetry;
use mile_planner_shared::validation::{validate_history_entry, validate_history_update};
use mile_planner_shared::{HistoryEntry, HistoryLog, HistoryUpdate, NewHistoryEntry};
use sqlx::PgPool;
use tracing::{debug, error};
use uuid::Uuid;

const SAVE_RETRY: &str = "Failed to save workout log; please retry";

pub struct HistoryService;

impl HistoryService {
    /// Every entry of an account as a queryable log
    pub async fn load_log(pool: &PgPool, account_id: Uuid) -> Result<HistoryLog, ApiError> {
        let records = HistoryRepository::list(pool, account_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(records.into_iter().map(HistoryEntry::from).collect())
    }

    /// Journal view, newest first
    pub async fn list(pool: &PgPool, account_id: Uuid) -> Result<Vec<HistoryEntry>, ApiError> {
        let records = HistoryRepository::list(pool, account_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    pub async fn for_workout(
        pool: &PgPool,
        account_id: Uuid,
        workout_id: &str,
    ) -> Result<Vec<HistoryEntry>, ApiError> {
        let records = HistoryRepository::list_for_workout(pool, account_id, workout_id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    pub async fn last_performance(
        pool: &PgPool,
        account_id: Uuid,
        workout_id: &str,
    ) -> Result<Option<HistoryEntry>, ApiError> {
        Ok(Self::for_workout(pool, account_id, workout_id)
            .await?
            .into_iter()
            .next())
    }

    /// Log a performance that is not tied to a scheduled placement
    pub async fn append(
        pool: &PgPool,
        cache: &CatalogCache,
        account_id: Uuid,
        email: Option<&str>,
        entry: NewHistoryEntry,
    ) -> Result<HistoryEntry, ApiError> {
        validate_history_entry(&entry)?;

        let catalog = CatalogService::load(pool, cache).await?;
        if !catalog.contains(&entry.workout_id) {
            return Err(ApiError::BadRequest(format!("Unknown workout: {}", entry.workout_id)));
        }

        mirror_account(pool, account_id, email).await?;

        let record = HistoryRepository::insert(pool, account_id, &entry)
            .await
            .map_err(|e| {
                error!(workout_id = %entry.workout_id, error = ?e, "Failed to save history entry");
                telemetry::record_persist_failure("append_history");
                ApiError::from_write(&e, SAVE_RETRY)
            })?;

        telemetry::record_mutation("append_history");
        debug!(entry_id = %record.id, "History entry appended");
        Ok(record.into())
    }

    pub async fn update(
        pool: &PgPool,
        account_id: Uuid,
        id: Uuid,
        changes: HistoryUpdate,
    ) -> Result<HistoryEntry, ApiError> {
        validate_history_update(&changes)?;

        let current: HistoryEntry = HistoryRepository::find(pool, account_id, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("History entry not found".to_string()))?
            .into();

        let updated = current.with_update(changes);
        let record = HistoryRepository::update(pool, account_id, &updated)
            .await
            .map_err(|e| {
                error!(entry_id = %id, error = ?e, "Failed to update history entry");
                telemetry::record_persist_failure("update_history");
                ApiError::from_write(&e, SAVE_RETRY)
            })?
            .ok_or_else(|| ApiError::NotFound("History entry not found".to_string()))?;

        telemetry::record_mutation("update_history");
        Ok(record.into())
    }
}
