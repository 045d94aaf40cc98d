//! Read-side annotations
//!
//! Joins schedule placements and history entries against the catalog to
//! produce display-ready views. Nothing here mutates its inputs.

use crate::calendar::{day_label, week_start};
use crate::catalog::Catalog;
use crate::history::HistoryLog;
use crate::models::{HistoryEntry, InstanceId, ScheduledWorkout, WeekSlot, WorkoutDefinition};
use crate::schedule::Schedule;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A placement with its definition and latest performance resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedWorkout {
    pub instance_id: InstanceId,
    pub original_id: String,
    pub day: String,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub rx: String,
    pub known: bool,
    pub completed: bool,
    pub completed_date: Option<NaiveDate>,
    pub completed_notes: Option<String>,
    pub last_performance: Option<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedWeek {
    pub week_number: u32,
    pub start_date: Option<String>,
    pub mileage_goal: Option<String>,
    pub actual_mileage: Option<String>,
    pub workouts: Vec<AnnotatedWorkout>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedSchedule {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub weeks: Vec<AnnotatedWeek>,
}

/// A catalog definition paired with its latest performance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedDefinition {
    #[serde(flatten)]
    pub definition: WorkoutDefinition,
    pub last_performance: Option<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnnotatedCategory {
    pub key: String,
    pub name: String,
    pub description: String,
    pub workouts: Vec<AnnotatedDefinition>,
}

fn annotate_instance(
    index: usize,
    instance: &ScheduledWorkout,
    catalog: &Catalog,
    history: &HistoryLog,
) -> AnnotatedWorkout {
    let resolved = catalog.resolve(&instance.original_id);
    let definition = resolved.definition();

    AnnotatedWorkout {
        instance_id: instance.instance_id,
        original_id: instance.original_id.clone(),
        day: day_label(index),
        name: resolved.name().to_string(),
        nickname: resolved.nickname().to_string(),
        description: definition.map(|d| d.description.clone()).unwrap_or_default(),
        rx: definition.map(|d| d.rx.clone()).unwrap_or_default(),
        known: definition.is_some(),
        completed: instance.completed,
        completed_date: instance.completed_date,
        completed_notes: instance.completed_notes.clone(),
        last_performance: history.last_performance_for(&instance.original_id).cloned(),
    }
}

pub fn annotate_week(
    week: &WeekSlot,
    start_date: Option<NaiveDate>,
    catalog: &Catalog,
    history: &HistoryLog,
) -> AnnotatedWeek {
    AnnotatedWeek {
        week_number: week.week_number,
        start_date: week_start(week.week_number, start_date),
        mileage_goal: week.mileage_goal.clone(),
        actual_mileage: week.actual_mileage.clone(),
        workouts: week
            .workouts
            .iter()
            .enumerate()
            .map(|(i, w)| annotate_instance(i, w, catalog, history))
            .collect(),
    }
}

pub fn annotate_schedule(schedule: &Schedule, catalog: &Catalog, history: &HistoryLog) -> AnnotatedSchedule {
    AnnotatedSchedule {
        name: schedule.name().to_string(),
        start_date: schedule.start_date(),
        weeks: schedule
            .weeks()
            .iter()
            .map(|w| annotate_week(w, schedule.start_date(), catalog, history))
            .collect(),
    }
}

/// Catalog browsing view with each definition's latest performance
pub fn annotate_catalog(catalog: &Catalog, history: &HistoryLog) -> Vec<AnnotatedCategory> {
    catalog
        .categories()
        .iter()
        .map(|category| AnnotatedCategory {
            key: category.key.clone(),
            name: category.name.clone(),
            description: category.description.clone(),
            workouts: category
                .workouts
                .iter()
                .map(|def| AnnotatedDefinition {
                    definition: def.clone(),
                    last_performance: history.last_performance_for(&def.id).cloned(),
                })
                .collect(),
        })
        .collect()
}
