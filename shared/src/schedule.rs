//! Schedule model and its mutation operations
//!
//! A schedule is a fixed run of twelve week slots. Each slot holds its
//! placed workouts in insertion order; nothing is ever sorted implicitly.
//! Index-based operations take 0-based week and instance indices and are
//! no-ops (returning `None`/`false`) when an index is out of range.

use crate::catalog::Catalog;
use crate::errors::ScheduleError;
use crate::models::{InstanceId, MileageField, ScheduledWorkout, WeekSlot, WorkoutDefinition};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of week slots in every schedule
pub const WEEKS_PER_SCHEDULE: usize = 12;

/// The payload carried by a drag-and-drop (or picker selection) into a week
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferPayload {
    pub workout_id: String,
}

impl TransferPayload {
    pub fn for_definition(definition: &WorkoutDefinition) -> Self {
        Self {
            workout_id: definition.id.clone(),
        }
    }
}

/// Serialized form of a [`Schedule`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleParts {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    pub weeks: Vec<WeekSlot>,
}

/// A twelve-week training schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleParts", into = "ScheduleParts")]
pub struct Schedule {
    name: String,
    start_date: Option<NaiveDate>,
    weeks: Vec<WeekSlot>,
}

impl TryFrom<ScheduleParts> for Schedule {
    type Error = ScheduleError;

    fn try_from(parts: ScheduleParts) -> Result<Self, Self::Error> {
        Self::from_parts(parts.name, parts.start_date, parts.weeks)
    }
}

impl From<Schedule> for ScheduleParts {
    fn from(schedule: Schedule) -> Self {
        Self {
            name: schedule.name,
            start_date: schedule.start_date,
            weeks: schedule.weeks,
        }
    }
}

impl Schedule {
    /// An empty schedule with weeks 1 through 12
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_date: None,
            weeks: (1..=WEEKS_PER_SCHEDULE as u32).map(WeekSlot::empty).collect(),
        }
    }

    /// Rebuild a schedule from stored weeks
    ///
    /// Weeks may arrive in any order but must cover 1..=12 exactly once, and
    /// no instance id may appear twice.
    pub fn from_parts(
        name: String,
        start_date: Option<NaiveDate>,
        mut weeks: Vec<WeekSlot>,
    ) -> Result<Self, ScheduleError> {
        if weeks.len() != WEEKS_PER_SCHEDULE {
            return Err(ScheduleError::WrongWeekCount {
                expected: WEEKS_PER_SCHEDULE,
                actual: weeks.len(),
            });
        }

        weeks.sort_by_key(|w| w.week_number);
        for (index, week) in weeks.iter().enumerate() {
            if week.week_number != index as u32 + 1 {
                return Err(ScheduleError::InvalidWeekNumber(week.week_number));
            }
        }

        let mut seen = HashSet::new();
        for instance in weeks.iter().flat_map(|w| &w.workouts) {
            if !seen.insert(instance.instance_id) {
                return Err(ScheduleError::DuplicateInstance(instance.instance_id.to_string()));
            }
        }

        Ok(Self {
            name,
            start_date,
            weeks,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn weeks(&self) -> &[WeekSlot] {
        &self.weeks
    }

    pub fn week(&self, week_index: usize) -> Option<&WeekSlot> {
        self.weeks.get(week_index)
    }

    pub fn instance(&self, week_index: usize, instance_index: usize) -> Option<&ScheduledWorkout> {
        self.weeks.get(week_index)?.workouts.get(instance_index)
    }

    pub(crate) fn instance_mut(
        &mut self,
        week_index: usize,
        instance_index: usize,
    ) -> Option<&mut ScheduledWorkout> {
        self.weeks.get_mut(week_index)?.workouts.get_mut(instance_index)
    }

    /// Locate a placement by id as `(week_index, instance_index)`
    pub fn find_instance(&self, id: InstanceId) -> Option<(usize, usize)> {
        self.weeks.iter().enumerate().find_map(|(week_index, week)| {
            week.workouts
                .iter()
                .position(|w| w.instance_id == id)
                .map(|instance_index| (week_index, instance_index))
        })
    }

    /// Total number of placed workouts across all weeks
    pub fn instance_count(&self) -> usize {
        self.weeks.iter().map(|w| w.workouts.len()).sum()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_start_date(&mut self, start_date: Option<NaiveDate>) {
        self.start_date = start_date;
    }

    /// Generate an instance id not used anywhere in this schedule
    fn fresh_instance_id(&self) -> InstanceId {
        loop {
            let id = InstanceId::new();
            if self.find_instance(id).is_none() {
                return id;
            }
        }
    }

    /// Append a copy of `definition` to a week
    ///
    /// Returns the position of the new placement, or `None` when the week
    /// index is out of range (nothing changes in that case).
    pub fn place_workout(&mut self, week_index: usize, definition: &WorkoutDefinition) -> Option<usize> {
        if week_index >= self.weeks.len() {
            return None;
        }
        let instance = ScheduledWorkout::from_definition(self.fresh_instance_id(), definition);
        let week = &mut self.weeks[week_index];
        week.workouts.push(instance);
        Some(week.workouts.len() - 1)
    }

    /// Resolve a transfer payload against the catalog and place it
    ///
    /// An id that is not in the catalog is rejected; an out-of-range week is
    /// a no-op like [`Schedule::place_workout`].
    pub fn drop_payload(
        &mut self,
        week_index: usize,
        payload: &TransferPayload,
        catalog: &Catalog,
    ) -> Result<Option<usize>, ScheduleError> {
        let definition = catalog
            .find(&payload.workout_id)
            .ok_or_else(|| ScheduleError::UnknownWorkout(payload.workout_id.clone()))?;
        Ok(self.place_workout(week_index, definition))
    }

    /// Remove the placement at a position and return it
    pub fn remove_workout(&mut self, week_index: usize, instance_index: usize) -> Option<ScheduledWorkout> {
        let week = self.weeks.get_mut(week_index)?;
        if instance_index >= week.workouts.len() {
            return None;
        }
        Some(week.workouts.remove(instance_index))
    }

    /// Insert a copy right after the placement at `instance_index`
    ///
    /// The copy gets a new instance id and points at the same root
    /// definition as its source. Completion state is not copied.
    pub fn duplicate_workout(&mut self, week_index: usize, instance_index: usize) -> Option<usize> {
        let source = self.instance(week_index, instance_index)?;
        let copy = ScheduledWorkout {
            instance_id: self.fresh_instance_id(),
            original_id: source.original_id.clone(),
            completed: false,
            completed_date: None,
            completed_notes: None,
        };

        let week = &mut self.weeks[week_index];
        week.workouts.insert(instance_index + 1, copy);
        Some(instance_index + 1)
    }

    /// Move a placement within or across weeks
    ///
    /// The placement keeps its id and completion state. `to_index` is clamped
    /// to the destination week's length after removal. Returns the final
    /// position, or `None` if either week or the source is out of range.
    pub fn move_workout(
        &mut self,
        from_week: usize,
        from_index: usize,
        to_week: usize,
        to_index: usize,
    ) -> Option<usize> {
        if to_week >= self.weeks.len() {
            return None;
        }
        let instance = self.remove_workout(from_week, from_index)?;
        let destination = &mut self.weeks[to_week];
        let position = to_index.min(destination.workouts.len());
        destination.workouts.insert(position, instance);
        Some(position)
    }

    /// Set a week's mileage goal or actual mileage
    ///
    /// The text is stored as entered; blank text clears the field. Returns
    /// `false` when the week index is out of range.
    pub fn update_mileage(&mut self, week_index: usize, field: MileageField, value: &str) -> bool {
        let Some(week) = self.weeks.get_mut(week_index) else {
            return false;
        };

        let value = value.trim();
        let value = if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        };

        match field {
            MileageField::MileageGoal => week.mileage_goal = value,
            MileageField::ActualMileage => week.actual_mileage = value,
        }
        true
    }
}

/// Convert a 1-based week number into a week index
pub fn week_index(week_number: u32) -> Option<usize> {
    match week_number {
        1..=12 => Some(week_number as usize - 1),
        _ => None,
    }
}
