//! Two-phase completion of scheduled workouts
//!
//! Completing a placement touches two records: the placement's completion
//! flag and a new history entry. The store write is the only step that can
//! fail, so the local flag is tied to its outcome through an explicit
//! [`CompletionPolicy`]:
//!
//! - `ConfirmFirst` stages the change and flips the flag only after the
//!   store has acknowledged the history entry.
//! - `Optimistic` flips the flag up front and restores the previous state if
//!   the store reports an error.
//!
//! Either way a failed write leaves the placement not completed.

use crate::errors::{CompletionError, ScheduleError};
use crate::models::{HistoryEntry, InstanceId, NewHistoryEntry, ScheduledWorkout};
use crate::schedule::Schedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// How the local completion flag relates to the store acknowledgment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    #[default]
    ConfirmFirst,
    Optimistic,
}

/// What the user entered when marking a workout done
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionData {
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub actual_times: Vec<String>,
    #[serde(default)]
    pub target_times: Vec<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub rating: i32,
}

/// A completion that has been checked against the schedule but not applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCompletion {
    pub instance_id: InstanceId,
    pub date: NaiveDate,
    pub notes: Option<String>,
    /// History entry keyed by the placement's root definition
    pub entry: NewHistoryEntry,
    previous: ScheduledWorkout,
}

impl Schedule {
    /// Validate a completion without changing anything
    pub fn stage_completion(
        &self,
        week_index: usize,
        instance_index: usize,
        data: CompletionData,
    ) -> Result<PendingCompletion, ScheduleError> {
        let week = self
            .week(week_index)
            .ok_or(ScheduleError::WeekOutOfRange(week_index))?;
        let instance = week
            .workouts
            .get(instance_index)
            .ok_or(ScheduleError::InstanceOutOfRange {
                week: week.week_number,
                index: instance_index,
            })?;

        if instance.completed {
            return Err(ScheduleError::AlreadyCompleted);
        }

        let entry = NewHistoryEntry {
            workout_id: instance.original_id.clone(),
            date: data.date,
            actual_times: data.actual_times,
            target_times: data.target_times,
            notes: data.notes.clone(),
            weather: data.weather,
            location: data.location,
            rating: data.rating,
        };

        Ok(PendingCompletion {
            instance_id: instance.instance_id,
            date: data.date,
            notes: data.notes,
            entry,
            previous: instance.clone(),
        })
    }

    /// Apply a staged completion to the placement it was staged for
    ///
    /// The placement is located by id, so it may have moved since staging.
    pub fn commit_completion(&mut self, pending: &PendingCompletion) -> Result<(), ScheduleError> {
        let (week_index, instance_index) = self
            .find_instance(pending.instance_id)
            .ok_or_else(|| ScheduleError::InstanceMissing(pending.instance_id.to_string()))?;

        if let Some(instance) = self.instance_mut(week_index, instance_index) {
            instance.completed = true;
            instance.completed_date = Some(pending.date);
            instance.completed_notes = pending.notes.clone();
        }
        Ok(())
    }

    /// Restore the placement to its state before a completion was applied
    pub fn rollback_completion(&mut self, pending: &PendingCompletion) {
        if let Some((week_index, instance_index)) = self.find_instance(pending.instance_id) {
            if let Some(instance) = self.instance_mut(week_index, instance_index) {
                *instance = pending.previous.clone();
            }
        }
    }
}

/// Complete a placement and record it through `persist`
///
/// `persist` receives the staged completion and must durably store both the
/// history entry and the placement's completion flag, returning the stored
/// entry. The schedule ends up completed exactly when `persist` succeeds.
pub async fn complete_instance<F, Fut, E>(
    schedule: &mut Schedule,
    week_index: usize,
    instance_index: usize,
    data: CompletionData,
    policy: CompletionPolicy,
    persist: F,
) -> Result<HistoryEntry, CompletionError<E>>
where
    F: FnOnce(PendingCompletion) -> Fut,
    Fut: Future<Output = Result<HistoryEntry, E>>,
{
    let pending = schedule.stage_completion(week_index, instance_index, data)?;

    match policy {
        CompletionPolicy::ConfirmFirst => {
            let stored = persist(pending.clone())
                .await
                .map_err(CompletionError::Persist)?;
            schedule.commit_completion(&pending)?;
            Ok(stored)
        }
        CompletionPolicy::Optimistic => {
            schedule.commit_completion(&pending)?;
            match persist(pending.clone()).await {
                Ok(stored) => Ok(stored),
                Err(err) => {
                    schedule.rollback_completion(&pending);
                    Err(CompletionError::Persist(err))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::history::HistoryLog;
    use rstest::rstest;
    use std::cell::RefCell;
    use tokio_test::block_on;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn completion(rating: i32) -> CompletionData {
        CompletionData {
            date: date(2025, 1, 10),
            notes: Some("Windy back straight".to_string()),
            actual_times: vec!["69.5".to_string(), "3:12.0".to_string()],
            target_times: vec!["70".to_string(), "3:15".to_string()],
            weather: Some("Cool".to_string()),
            location: Some("Track".to_string()),
            rating,
        }
    }

    fn schedule_with_p1_in_week_3() -> Schedule {
        let catalog = Catalog::seeded();
        let mut schedule = Schedule::new("Indoor mile");
        schedule.place_workout(2, catalog.find("p1").unwrap()).unwrap();
        schedule
    }

    #[rstest]
    #[case(CompletionPolicy::ConfirmFirst)]
    #[case(CompletionPolicy::Optimistic)]
    fn test_complete_records_history_and_flag(#[case] policy: CompletionPolicy) {
        let mut schedule = schedule_with_p1_in_week_3();
        let log = RefCell::new(HistoryLog::default());

        let stored = block_on(complete_instance(
            &mut schedule,
            2,
            0,
            completion(8),
            policy,
            |pending| {
                let log = &log;
                async move {
                    let entry = pending.entry.into_entry(Uuid::new_v4());
                    log.borrow_mut().append(entry.clone());
                    Ok::<_, String>(entry)
                }
            },
        ))
        .unwrap();

        let week = schedule.week(2).unwrap();
        assert_eq!(week.workouts.len(), 1);
        assert!(week.workouts[0].completed);
        assert_eq!(week.workouts[0].completed_date, Some(date(2025, 1, 10)));
        assert_eq!(week.workouts[0].completed_notes.as_deref(), Some("Windy back straight"));

        let log = log.into_inner();
        assert_eq!(log.len(), 1);
        let entry = log.last_performance_for("p1").unwrap();
        assert_eq!(entry.rating, 8);
        assert_eq!(entry.workout_id, "p1");
        assert_eq!(entry.id, stored.id);
    }

    #[rstest]
    #[case(CompletionPolicy::ConfirmFirst)]
    #[case(CompletionPolicy::Optimistic)]
    fn test_failed_persist_leaves_instance_incomplete(#[case] policy: CompletionPolicy) {
        let mut schedule = schedule_with_p1_in_week_3();
        let before = schedule.clone();

        let result = block_on(complete_instance(
            &mut schedule,
            2,
            0,
            completion(8),
            policy,
            |_pending| async { Err::<HistoryEntry, _>("connection reset".to_string()) },
        ));

        match result {
            Err(CompletionError::Persist(msg)) => assert_eq!(msg, "connection reset"),
            other => panic!("expected persist failure, got {:?}", other),
        }
        assert_eq!(schedule, before);
    }

    #[test]
    fn test_optimistic_flag_is_visible_before_ack() {
        let mut schedule = schedule_with_p1_in_week_3();
        let instance_id = schedule.instance(2, 0).unwrap().instance_id;
        let pending = schedule.stage_completion(2, 0, completion(6)).unwrap();

        schedule.commit_completion(&pending).unwrap();
        assert!(schedule.instance(2, 0).unwrap().completed);

        schedule.rollback_completion(&pending);
        let restored = schedule.instance(2, 0).unwrap();
        assert!(!restored.completed);
        assert_eq!(restored.instance_id, instance_id);
        assert_eq!(restored.completed_date, None);
    }

    #[test]
    fn test_stage_does_not_mutate() {
        let schedule = schedule_with_p1_in_week_3();
        let before = schedule.clone();
        let pending = schedule.stage_completion(2, 0, completion(8)).unwrap();
        assert_eq!(pending.entry.workout_id, "p1");
        assert_eq!(schedule, before);
    }

    #[test]
    fn test_stage_rejects_bad_positions() {
        let schedule = schedule_with_p1_in_week_3();
        assert_eq!(
            schedule.stage_completion(12, 0, completion(8)).unwrap_err(),
            ScheduleError::WeekOutOfRange(12)
        );
        assert_eq!(
            schedule.stage_completion(2, 1, completion(8)).unwrap_err(),
            ScheduleError::InstanceOutOfRange { week: 3, index: 1 }
        );
    }

    #[test]
    fn test_already_completed_is_rejected() {
        let mut schedule = schedule_with_p1_in_week_3();
        let pending = schedule.stage_completion(2, 0, completion(8)).unwrap();
        schedule.commit_completion(&pending).unwrap();

        assert_eq!(
            schedule.stage_completion(2, 0, completion(8)).unwrap_err(),
            ScheduleError::AlreadyCompleted
        );
    }

    #[test]
    fn test_duplicate_completion_keys_history_by_root() {
        let mut schedule = schedule_with_p1_in_week_3();
        schedule.duplicate_workout(2, 0).unwrap();
        schedule.remove_workout(2, 0).unwrap();

        let pending = schedule.stage_completion(2, 0, completion(7)).unwrap();
        assert_eq!(pending.entry.workout_id, "p1");
    }

    #[test]
    fn test_policy_serde_names() {
        let policy: CompletionPolicy = serde_json::from_str("\"optimistic\"").unwrap();
        assert_eq!(policy, CompletionPolicy::Optimistic);
        assert_eq!(
            serde_json::to_string(&CompletionPolicy::ConfirmFirst).unwrap(),
            "\"confirm_first\""
        );
    }
}
