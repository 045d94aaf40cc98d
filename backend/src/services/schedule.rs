//! Training schedule service
//!
//! Every edit opens a transaction, locks the schedule row, loads the
//! schedule, applies one domain mutation and writes back only the weeks it
//! touched before committing. Edits of one schedule therefore apply one
//! after another. Access is resolved per request: owners may do anything,
//! shared accounts view or edit according to their share, everyone else
//! sees a 404.

use crate::cache::CatalogCache;
use crate::error::ApiError;
use crate::repositories::schedule::{format_mileage, parse_mileage, PlacementRecord, WeekRecord};
use crate::repositories::{ScheduleRecord, ScheduleRepository, ShareRepository};
use crate::services::catalog::CatalogService;
use crate::services::history::HistoryService;
use crate::services::{mirror_account, write_failed};
use crate::telemetry;
use mile_planner_shared::errors::CompletionError;
use mile_planner_shared::reconcile::annotate_schedule;
use mile_planner_shared::types::{
    CompletionResponse, CreateScheduleRequest, PlacementResponse, ScheduleDetail, ScheduleSummary,
    UpdateScheduleRequest,
};
use mile_planner_shared::validation::{
    require_text, validate_history_entry, validate_week_number, MAX_NAME_LEN,
};
use mile_planner_shared::{
    complete_instance, week_index, CompletionData, CompletionPolicy, HistoryEntry, InstanceId,
    MileageField, PermissionLevel, Schedule, SchedulePermissions, ScheduledWorkout, TransferPayload,
    WeekSlot,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error, info};
use uuid::Uuid;

/// Who is asking, as taken from the verified token
#[derive(Debug, Clone, Copy)]
pub struct Caller<'a> {
    pub account_id: Uuid,
    pub email: Option<&'a str>,
}

/// 1-based week from the path to a slot index
fn slot_index(week_number: u32) -> Result<usize, ApiError> {
    validate_week_number(week_number)?;
    week_index(week_number).ok_or_else(|| ApiError::NotFound(format!("Week {} not found", week_number)))
}

const SAVE_RETRY: &str = "Failed to save schedule; please retry";

/// Open transaction holding the schedule row lock
type EditTx = Transaction<'static, Postgres>;

fn instance_missing(week_number: u32, index: usize) -> ApiError {
    ApiError::NotFound(format!("No workout at position {} in week {}", index, week_number))
}

/// Domain schedule from its header, week and placement rows
fn assemble(
    record: &ScheduleRecord,
    weeks: Vec<WeekRecord>,
    placements: Vec<PlacementRecord>,
) -> Result<Schedule, ApiError> {
    let mut slots: Vec<WeekSlot> = weeks
        .into_iter()
        .map(|w| WeekSlot {
            week_number: w.week_number as u32,
            workouts: Vec::new(),
            mileage_goal: format_mileage(w.mileage_goal),
            actual_mileage: format_mileage(w.actual_mileage),
        })
        .collect();

    for placement in placements {
        if let Some(slot) = slots
            .iter_mut()
            .find(|s| s.week_number == placement.week_number as u32)
        {
            slot.workouts.push(ScheduledWorkout {
                instance_id: InstanceId(placement.id),
                original_id: placement.workout_id,
                completed: placement.completed,
                completed_date: placement.completed_date,
                completed_notes: placement.completed_notes,
            });
        }
    }

    Ok(Schedule::from_parts(
        record.name.clone(),
        record.training_start_date,
        slots,
    )?)
}

pub struct ScheduleService;

impl ScheduleService {
    /// Effective permissions of an account on an existing schedule
    pub async fn permissions(
        pool: &PgPool,
        schedule_id: Uuid,
        account_id: Uuid,
    ) -> Result<(ScheduleRecord, SchedulePermissions), ApiError> {
        let record = ScheduleRepository::find(pool, schedule_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Schedule not found".to_string()))?;

        if record.owner_id == account_id {
            return Ok((record, SchedulePermissions::owner()));
        }

        let level = ShareRepository::permission_for(pool, schedule_id, account_id)
            .await
            .map_err(ApiError::Internal)?;
        let permissions = match level {
            Some(level) => {
                let level: PermissionLevel = level
                    .parse()
                    .map_err(|e: String| ApiError::Internal(anyhow::anyhow!(e)))?;
                SchedulePermissions::shared(level)
            }
            None => SchedulePermissions::none(),
        };
        Ok((record, permissions))
    }

    async fn authorize(
        pool: &PgPool,
        schedule_id: Uuid,
        account_id: Uuid,
        need_edit: bool,
    ) -> Result<(ScheduleRecord, SchedulePermissions), ApiError> {
        let (record, permissions) = Self::permissions(pool, schedule_id, account_id).await?;
        if !permissions.can_view {
            return Err(ApiError::NotFound("Schedule not found".to_string()));
        }
        if need_edit && !permissions.can_edit {
            return Err(ApiError::Forbidden(
                "You do not have permission to edit this schedule".to_string(),
            ));
        }
        Ok((record, permissions))
    }

    async fn authorize_owner(
        pool: &PgPool,
        schedule_id: Uuid,
        account_id: Uuid,
    ) -> Result<ScheduleRecord, ApiError> {
        let (record, permissions) = Self::authorize(pool, schedule_id, account_id, false).await?;
        if !permissions.is_owner {
            return Err(ApiError::Forbidden(
                "Only the owner can do this".to_string(),
            ));
        }
        Ok(record)
    }

    /// Rebuild the domain schedule from its rows
    pub async fn load_schedule(pool: &PgPool, record: &ScheduleRecord) -> Result<Schedule, ApiError> {
        let weeks = ScheduleRepository::load_weeks(pool, record.id)
            .await
            .map_err(ApiError::Internal)?;
        let placements = ScheduleRepository::load_placements(pool, record.id)
            .await
            .map_err(ApiError::Internal)?;
        assemble(record, weeks, placements)
    }

    /// Lock a schedule and load it inside a new transaction
    ///
    /// The lock is held until the returned transaction commits or drops.
    async fn begin_edit(pool: &PgPool, schedule_id: Uuid) -> Result<(EditTx, Schedule), ApiError> {
        let mut tx = pool.begin().await.map_err(|e| ApiError::Internal(e.into()))?;

        let record = ScheduleRepository::lock_for_update(&mut tx, schedule_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Schedule not found".to_string()))?;
        let weeks = ScheduleRepository::load_weeks(&mut *tx, schedule_id)
            .await
            .map_err(ApiError::Internal)?;
        let placements = ScheduleRepository::load_placements(&mut *tx, schedule_id)
            .await
            .map_err(ApiError::Internal)?;

        let schedule = assemble(&record, weeks, placements)?;
        Ok((tx, schedule))
    }

    async fn detail(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        schedule: &Schedule,
        permissions: SchedulePermissions,
    ) -> Result<ScheduleDetail, ApiError> {
        let catalog = CatalogService::load(pool, cache).await?;
        let history = HistoryService::load_log(pool, account_id).await?;
        Ok(ScheduleDetail {
            id: schedule_id,
            schedule: annotate_schedule(schedule, &catalog, &history),
            permissions,
        })
    }

    /// Write back the given weeks and release the lock
    async fn commit_weeks(
        mut tx: EditTx,
        schedule_id: Uuid,
        weeks: Vec<WeekSlot>,
        action: &'static str,
    ) -> Result<(), ApiError> {
        let written = match ScheduleRepository::save_weeks(&mut tx, schedule_id, &weeks).await {
            Ok(()) => tx.commit().await.map_err(anyhow::Error::from),
            Err(e) => Err(e),
        };
        written.map_err(|e| {
            error!(%schedule_id, action, error = ?e, "Failed to save schedule");
            telemetry::record_persist_failure(action);
            ApiError::from_write(&e, SAVE_RETRY)
        })?;

        telemetry::record_mutation(action);
        debug!(%schedule_id, action, "Schedule updated");
        Ok(())
    }

    fn week_copy(schedule: &Schedule, index: usize) -> Result<WeekSlot, ApiError> {
        schedule
            .week(index)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Week {} not found", index + 1)))
    }

    // ------------------------------------------------------------------
    // Header operations
    // ------------------------------------------------------------------

    pub async fn list(pool: &PgPool, account_id: Uuid) -> Result<Vec<ScheduleSummary>, ApiError> {
        let records = ScheduleRepository::list_for_account(pool, account_id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(records
            .into_iter()
            .map(|r| {
                let is_owner = r.owner_id == account_id;
                ScheduleSummary {
                    id: r.id,
                    name: r.name,
                    start_date: r.training_start_date,
                    owner_id: r.owner_id,
                    is_owner,
                    permission: if is_owner {
                        None
                    } else {
                        r.permission_level.and_then(|l| l.parse().ok())
                    },
                    updated_at: r.updated_at,
                }
            })
            .collect())
    }

    pub async fn create(
        pool: &PgPool,
        cache: &CatalogCache,
        caller: Caller<'_>,
        request: CreateScheduleRequest,
    ) -> Result<ScheduleDetail, ApiError> {
        require_text("name", &request.name, MAX_NAME_LEN)?;

        mirror_account(pool, caller.account_id, caller.email).await?;

        let mut schedule = Schedule::new(request.name.trim());
        schedule.set_start_date(request.start_date);

        let record = ScheduleRepository::create(
            pool,
            caller.account_id,
            schedule.name(),
            schedule.start_date(),
            schedule.weeks(),
        )
        .await
        .map_err(write_failed("create_schedule", SAVE_RETRY))?;

        telemetry::record_mutation("create_schedule");
        info!(schedule_id = %record.id, "Schedule created");
        Self::detail(pool, cache, record.id, caller.account_id, &schedule, SchedulePermissions::owner()).await
    }

    pub async fn get(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
    ) -> Result<ScheduleDetail, ApiError> {
        let (record, permissions) = Self::authorize(pool, schedule_id, account_id, false).await?;
        let schedule = Self::load_schedule(pool, &record).await?;
        Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await
    }

    /// Rename or re-date a schedule
    pub async fn update_header(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        request: UpdateScheduleRequest,
    ) -> Result<ScheduleDetail, ApiError> {
        let (record, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        let mut schedule = Self::load_schedule(pool, &record).await?;

        if let Some(name) = &request.name {
            require_text("name", name, MAX_NAME_LEN)?;
            schedule.rename(name.trim());
        }
        if request.clear_start_date {
            schedule.set_start_date(None);
        } else if request.start_date.is_some() {
            schedule.set_start_date(request.start_date);
        }

        ScheduleRepository::update_header(pool, schedule_id, schedule.name(), schedule.start_date())
            .await
            .map_err(write_failed("update_schedule", SAVE_RETRY))?
            .ok_or_else(|| ApiError::NotFound("Schedule not found".to_string()))?;

        telemetry::record_mutation("update_schedule");
        Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await
    }

    pub async fn delete(pool: &PgPool, schedule_id: Uuid, account_id: Uuid) -> Result<(), ApiError> {
        Self::authorize_owner(pool, schedule_id, account_id).await?;

        let deleted = ScheduleRepository::delete(pool, schedule_id)
            .await
            .map_err(write_failed("delete_schedule", "Failed to delete schedule; please retry"))?;
        if !deleted {
            return Err(ApiError::NotFound("Schedule not found".to_string()));
        }

        telemetry::record_mutation("delete_schedule");
        info!(%schedule_id, "Schedule deleted");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Week mutations
    // ------------------------------------------------------------------

    /// Drop a catalog workout at the end of a week
    pub async fn place(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        week_number: u32,
        payload: TransferPayload,
    ) -> Result<PlacementResponse, ApiError> {
        let week = slot_index(week_number)?;
        let (_, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        let catalog = CatalogService::load(pool, cache).await?;
        let (tx, mut schedule) = Self::begin_edit(pool, schedule_id).await?;

        let index = schedule
            .drop_payload(week, &payload, &catalog)?
            .ok_or_else(|| ApiError::NotFound(format!("Week {} not found", week_number)))?;

        Self::commit_weeks(tx, schedule_id, vec![Self::week_copy(&schedule, week)?], "place").await?;

        Ok(PlacementResponse {
            week: week_number,
            index,
            schedule: Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await?,
        })
    }

    /// Remove a placement; removing a position that is already empty is a no-op
    pub async fn remove(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        week_number: u32,
        index: usize,
    ) -> Result<ScheduleDetail, ApiError> {
        let week = slot_index(week_number)?;
        let (_, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        let (tx, mut schedule) = Self::begin_edit(pool, schedule_id).await?;

        if schedule.remove_workout(week, index).is_some() {
            Self::commit_weeks(tx, schedule_id, vec![Self::week_copy(&schedule, week)?], "remove").await?;
        }

        Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await
    }

    pub async fn duplicate(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        week_number: u32,
        index: usize,
    ) -> Result<PlacementResponse, ApiError> {
        let week = slot_index(week_number)?;
        let (_, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        let (tx, mut schedule) = Self::begin_edit(pool, schedule_id).await?;

        let copy_index = schedule
            .duplicate_workout(week, index)
            .ok_or_else(|| instance_missing(week_number, index))?;

        Self::commit_weeks(tx, schedule_id, vec![Self::week_copy(&schedule, week)?], "duplicate").await?;

        Ok(PlacementResponse {
            week: week_number,
            index: copy_index,
            schedule: Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await?,
        })
    }

    /// Reorder a placement within or across weeks
    #[allow(clippy::too_many_arguments)]
    pub async fn move_workout(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        week_number: u32,
        index: usize,
        to_week_number: u32,
        to_index: usize,
    ) -> Result<PlacementResponse, ApiError> {
        let from = slot_index(week_number)?;
        let to = slot_index(to_week_number)?;
        let (_, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        let (tx, mut schedule) = Self::begin_edit(pool, schedule_id).await?;

        let new_index = schedule
            .move_workout(from, index, to, to_index)
            .ok_or_else(|| instance_missing(week_number, index))?;

        let mut touched = vec![Self::week_copy(&schedule, from)?];
        if to != from {
            touched.push(Self::week_copy(&schedule, to)?);
        }
        Self::commit_weeks(tx, schedule_id, touched, "move").await?;

        Ok(PlacementResponse {
            week: to_week_number,
            index: new_index,
            schedule: Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await?,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_mileage(
        pool: &PgPool,
        cache: &CatalogCache,
        schedule_id: Uuid,
        account_id: Uuid,
        week_number: u32,
        field: MileageField,
        value: &str,
    ) -> Result<ScheduleDetail, ApiError> {
        let week = slot_index(week_number)?;
        // Keep what will be stored, so the response matches a reload
        let stored = format_mileage(parse_mileage(value)?).unwrap_or_default();
        let (_, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        let (tx, mut schedule) = Self::begin_edit(pool, schedule_id).await?;

        if !schedule.update_mileage(week, field, &stored) {
            return Err(ApiError::NotFound(format!("Week {} not found", week_number)));
        }
        Self::commit_weeks(tx, schedule_id, vec![Self::week_copy(&schedule, week)?], "mileage").await?;

        Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await
    }

    /// Mark a placement done and log it in the caller's history
    ///
    /// The flag and the history entry are written in the locked edit
    /// transaction; the configured policy decides when the in-memory flag
    /// flips.
    #[allow(clippy::too_many_arguments)]
    pub async fn complete(
        pool: &PgPool,
        cache: &CatalogCache,
        policy: CompletionPolicy,
        schedule_id: Uuid,
        caller: Caller<'_>,
        week_number: u32,
        index: usize,
        data: CompletionData,
    ) -> Result<CompletionResponse, ApiError> {
        let week = slot_index(week_number)?;

        let account_id = caller.account_id;
        let (_, permissions) = Self::authorize(pool, schedule_id, account_id, true).await?;
        mirror_account(pool, account_id, caller.email).await?;
        let (tx, mut schedule) = Self::begin_edit(pool, schedule_id).await?;

        let staged = schedule.stage_completion(week, index, data.clone())?;
        validate_history_entry(&staged.entry)?;

        let outcome = complete_instance(&mut schedule, week, index, data, policy, move |pending| async move {
            let mut tx = tx;
            let recorded =
                match ScheduleRepository::record_completion(&mut tx, schedule_id, account_id, &pending).await {
                    Ok(Some(record)) => tx.commit().await.map(|()| record).map_err(anyhow::Error::from),
                    Ok(None) => {
                        return Err(ApiError::Conflict(
                            "Workout was already completed or removed".to_string(),
                        ))
                    }
                    Err(e) => Err(e),
                };
            recorded.map(HistoryEntry::from).map_err(|e| {
                error!(%schedule_id, instance_id = %pending.instance_id, error = ?e, "Failed to record completion");
                telemetry::record_persist_failure("complete");
                ApiError::from_write(&e, "Failed to record completion; please retry")
            })
        })
        .await;

        let entry = outcome.map_err(|e| match e {
            CompletionError::Schedule(err) => ApiError::from(err),
            CompletionError::Persist(err) => err,
        })?;

        telemetry::record_mutation("complete");
        info!(%schedule_id, week = week_number, index, workout_id = %entry.workout_id, "Workout completed");

        Ok(CompletionResponse {
            entry,
            schedule: Self::detail(pool, cache, schedule_id, account_id, &schedule, permissions).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index_bounds() {
        assert_eq!(slot_index(1).unwrap(), 0);
        assert_eq!(slot_index(12).unwrap(), 11);
        assert!(matches!(slot_index(0), Err(ApiError::InvalidField(_))));
        assert!(matches!(slot_index(13), Err(ApiError::InvalidField(_))));
    }
}
