//! Workout catalog service
//!
//! Built-in workouts are read-only. Custom workouts may be edited or deleted
//! only by the account that created them, and never while placed in a
//! schedule.

use crate::cache::CatalogCache;
use crate::error::ApiError;
use crate::repositories::{CatalogRepository, WorkoutRecord};
use crate::services::history::HistoryService;
use crate::services::mirror_account;
use crate::telemetry;
use mile_planner_shared::reconcile::{annotate_catalog, AnnotatedCategory};
use mile_planner_shared::types::UpdateWorkoutRequest;
use mile_planner_shared::validation::{validate_new_workout, validate_workout_update};
use mile_planner_shared::{Catalog, NewWorkout, WorkoutDefinition, WorkoutVersion};
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct CatalogService;

impl CatalogService {
    /// Load the grouped catalog, from cache when possible
    pub async fn load(pool: &PgPool, cache: &CatalogCache) -> Result<Catalog, ApiError> {
        if let Some(json) = cache.get().await {
            match serde_json::from_str::<Catalog>(&json) {
                Ok(catalog) => return Ok(catalog),
                Err(e) => warn!("Discarding unreadable cached catalog: {}", e),
            }
        }

        let categories = CatalogRepository::list_categories(pool)
            .await
            .map_err(ApiError::Internal)?;
        let workouts = CatalogRepository::list_workouts(pool)
            .await
            .map_err(ApiError::Internal)?;

        let catalog = Catalog::from_definitions(
            categories.into_iter().map(Into::into).collect(),
            workouts.into_iter().map(Into::into).collect(),
        );

        if let Ok(json) = serde_json::to_string(&catalog) {
            cache.put(&json).await;
        }
        Ok(catalog)
    }

    /// Catalog with the account's last performance on each workout
    pub async fn annotated(
        pool: &PgPool,
        cache: &CatalogCache,
        account_id: Uuid,
    ) -> Result<Vec<AnnotatedCategory>, ApiError> {
        let catalog = Self::load(pool, cache).await?;
        let history = HistoryService::load_log(pool, account_id).await?;
        Ok(annotate_catalog(&catalog, &history))
    }

    async fn find_record(pool: &PgPool, id: &str) -> Result<WorkoutRecord, ApiError> {
        CatalogRepository::find(pool, id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound(format!("Workout {} not found", id)))
    }

    pub async fn get_workout(pool: &PgPool, id: &str) -> Result<WorkoutDefinition, ApiError> {
        Ok(Self::find_record(pool, id).await?.into())
    }

    fn ensure_editable(record: &WorkoutRecord, account_id: Uuid) -> Result<(), ApiError> {
        if !record.is_custom {
            return Err(ApiError::Forbidden("Built-in workouts cannot be modified".to_string()));
        }
        if record.created_by != Some(account_id) {
            return Err(ApiError::Forbidden(
                "Only the creator can modify this workout".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn create_workout(
        pool: &PgPool,
        cache: &CatalogCache,
        account_id: Uuid,
        email: Option<&str>,
        input: NewWorkout,
    ) -> Result<WorkoutDefinition, ApiError> {
        validate_new_workout(&input)?;

        if CatalogRepository::find(pool, &input.id)
            .await
            .map_err(ApiError::Internal)?
            .is_some()
        {
            return Err(ApiError::Conflict(format!("Workout id {} is already taken", input.id)));
        }

        mirror_account(pool, account_id, email).await?;

        let definition = WorkoutDefinition::from_new(input);
        let record = CatalogRepository::create(pool, &definition, account_id)
            .await
            .map_err(|e| {
                error!(workout_id = %definition.id, error = ?e, "Failed to create workout");
                telemetry::record_persist_failure("create_workout");
                ApiError::from_write(&e, "Failed to save workout; please retry")
            })?;

        cache.invalidate().await;
        telemetry::record_mutation("create_workout");
        info!(workout_id = %record.id, "Custom workout created");
        Ok(record.into())
    }

    /// Apply an edit, keeping the previous state as a version snapshot
    pub async fn update_workout(
        pool: &PgPool,
        cache: &CatalogCache,
        account_id: Uuid,
        id: &str,
        request: UpdateWorkoutRequest,
    ) -> Result<WorkoutDefinition, ApiError> {
        validate_workout_update(&request.changes)?;

        let record = Self::find_record(pool, id).await?;
        Self::ensure_editable(&record, account_id)?;

        let current: WorkoutDefinition = record.into();
        let snapshot = current.snapshot(request.edit_reason);
        let updated = current.with_update(&request.changes);

        let stored = CatalogRepository::update_with_snapshot(pool, &snapshot, &updated)
            .await
            .map_err(|e| {
                error!(workout_id = %id, error = ?e, "Failed to update workout");
                telemetry::record_persist_failure("update_workout");
                ApiError::from_write(&e, "Failed to save workout; please retry")
            })?
            .ok_or_else(|| ApiError::Conflict("Workout was changed by another edit".to_string()))?;

        cache.invalidate().await;
        telemetry::record_mutation("update_workout");
        info!(workout_id = %id, version = stored.version, "Workout updated");
        Ok(stored.into())
    }

    pub async fn delete_workout(
        pool: &PgPool,
        cache: &CatalogCache,
        account_id: Uuid,
        id: &str,
    ) -> Result<(), ApiError> {
        let record = Self::find_record(pool, id).await?;
        Self::ensure_editable(&record, account_id)?;

        let usages = CatalogRepository::count_placements(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        if usages > 0 {
            return Err(ApiError::Conflict(
                "Cannot delete workout as it is used in existing training schedules".to_string(),
            ));
        }

        let deleted = CatalogRepository::delete(pool, id).await.map_err(|e| {
            error!(workout_id = %id, error = ?e, "Failed to delete workout");
            telemetry::record_persist_failure("delete_workout");
            ApiError::from_write(&e, "Failed to delete workout; please retry")
        })?;
        if !deleted {
            return Err(ApiError::NotFound(format!("Workout {} not found", id)));
        }

        cache.invalidate().await;
        telemetry::record_mutation("delete_workout");
        info!(workout_id = %id, "Workout deleted");
        Ok(())
    }

    pub async fn versions(pool: &PgPool, id: &str) -> Result<Vec<WorkoutVersion>, ApiError> {
        Self::find_record(pool, id).await?;
        let records = CatalogRepository::list_versions(pool, id)
            .await
            .map_err(ApiError::Internal)?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
