//! Data models for the Mile Planner application

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Catalog
// ============================================================================

/// A workout in the library
///
/// Definitions are treated as immutable references during a session. An edit
/// produces a new value with a bumped `version`; the id never changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutDefinition {
    pub id: String,
    pub category: String,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub rx: String,
    pub version: i32,
    pub is_custom: bool,
}

/// Input for creating a custom workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWorkout {
    pub id: String,
    pub category: String,
    pub name: String,
    pub nickname: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rx: String,
}

/// Partial edit of a workout; `None` keeps the current value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutUpdate {
    pub category: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub description: Option<String>,
    pub rx: Option<String>,
}

impl WorkoutUpdate {
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.name.is_none()
            && self.nickname.is_none()
            && self.description.is_none()
            && self.rx.is_none()
    }
}

/// Snapshot of a definition taken right before it is overwritten
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWorkoutVersion {
    pub workout_id: String,
    pub version_number: i32,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub rx: String,
    pub category: String,
    pub edit_reason: Option<String>,
}

/// A stored version snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutVersion {
    pub id: Uuid,
    pub workout_id: String,
    pub version_number: i32,
    pub name: String,
    pub nickname: String,
    pub description: String,
    pub rx: String,
    pub category: String,
    pub edit_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl WorkoutDefinition {
    /// Build a definition for a freshly created custom workout
    pub fn from_new(input: NewWorkout) -> Self {
        Self {
            id: input.id,
            category: input.category,
            name: input.name,
            nickname: input.nickname,
            description: input.description,
            rx: input.rx,
            version: 1,
            is_custom: true,
        }
    }

    /// Capture the current state as a version record
    pub fn snapshot(&self, edit_reason: Option<String>) -> NewWorkoutVersion {
        NewWorkoutVersion {
            workout_id: self.id.clone(),
            version_number: self.version,
            name: self.name.clone(),
            nickname: self.nickname.clone(),
            description: self.description.clone(),
            rx: self.rx.clone(),
            category: self.category.clone(),
            edit_reason,
        }
    }

    /// Return the edited definition with the next version number
    pub fn with_update(&self, update: &WorkoutUpdate) -> Self {
        Self {
            id: self.id.clone(),
            category: update.category.clone().unwrap_or_else(|| self.category.clone()),
            name: update.name.clone().unwrap_or_else(|| self.name.clone()),
            nickname: update.nickname.clone().unwrap_or_else(|| self.nickname.clone()),
            description: update
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            rx: update.rx.clone().unwrap_or_else(|| self.rx.clone()),
            version: self.version + 1,
            is_custom: self.is_custom,
        }
    }
}

/// Named group of catalog workouts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkoutCategory {
    pub key: String,
    pub name: String,
    pub description: String,
    pub workouts: Vec<WorkoutDefinition>,
}

// ============================================================================
// Schedule
// ============================================================================

/// Identifier of one placement of a workout in a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A workout placed into a week
///
/// `original_id` always points at the root catalog definition, also for
/// duplicates of duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduledWorkout {
    pub instance_id: InstanceId,
    pub original_id: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed_notes: Option<String>,
}

impl ScheduledWorkout {
    /// Copy a definition into a new, not yet completed placement
    pub fn from_definition(instance_id: InstanceId, definition: &WorkoutDefinition) -> Self {
        Self {
            instance_id,
            original_id: definition.id.clone(),
            completed: false,
            completed_date: None,
            completed_notes: None,
        }
    }
}

/// Which mileage value of a week to edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MileageField {
    MileageGoal,
    ActualMileage,
}

/// One of the twelve weeks of a schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekSlot {
    pub week_number: u32,
    #[serde(default)]
    pub workouts: Vec<ScheduledWorkout>,
    #[serde(default)]
    pub mileage_goal: Option<String>,
    #[serde(default)]
    pub actual_mileage: Option<String>,
}

impl WeekSlot {
    pub fn empty(week_number: u32) -> Self {
        Self {
            week_number,
            workouts: Vec::new(),
            mileage_goal: None,
            actual_mileage: None,
        }
    }

    pub fn has_mileage(&self) -> bool {
        self.mileage_goal.is_some() || self.actual_mileage.is_some()
    }

    /// Weeks with nothing planned and no mileage are left out of exports
    pub fn is_blank(&self) -> bool {
        self.workouts.is_empty() && !self.has_mileage()
    }
}

// ============================================================================
// History
// ============================================================================

/// A logged workout performance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub workout_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub actual_times: Vec<String>,
    #[serde(default)]
    pub target_times: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub rating: i32,
}

/// A history entry that has not been stored yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewHistoryEntry {
    pub workout_id: String,
    pub date: NaiveDate,
    pub actual_times: Vec<String>,
    pub target_times: Vec<String>,
    pub notes: Option<String>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub rating: i32,
}

impl NewHistoryEntry {
    /// Attach the id assigned by the store
    pub fn into_entry(self, id: Uuid) -> HistoryEntry {
        HistoryEntry {
            id,
            workout_id: self.workout_id,
            date: self.date,
            actual_times: self.actual_times,
            target_times: self.target_times,
            notes: self.notes,
            weather: self.weather,
            location: self.location,
            rating: self.rating,
        }
    }
}

/// Explicit edit of a history entry; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryUpdate {
    pub date: Option<NaiveDate>,
    pub actual_times: Option<Vec<String>>,
    pub target_times: Option<Vec<String>>,
    pub notes: Option<String>,
    pub weather: Option<String>,
    pub location: Option<String>,
    pub rating: Option<i32>,
}

impl HistoryEntry {
    pub fn with_update(self, update: HistoryUpdate) -> Self {
        Self {
            id: self.id,
            workout_id: self.workout_id,
            date: update.date.unwrap_or(self.date),
            actual_times: update.actual_times.unwrap_or(self.actual_times),
            target_times: update.target_times.unwrap_or(self.target_times),
            notes: update.notes.or(self.notes),
            weather: update.weather.or(self.weather),
            location: update.location.or(self.location),
            rating: update.rating.unwrap_or(self.rating),
        }
    }
}

// ============================================================================
// Sharing
// ============================================================================

/// Access granted to another account on a shared schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    #[default]
    View,
    Edit,
}

impl PermissionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PermissionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            other => Err(format!("Unknown permission level: {}", other)),
        }
    }
}

/// Effective permissions of the calling account on a schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePermissions {
    pub is_owner: bool,
    pub can_edit: bool,
    pub can_view: bool,
}

impl SchedulePermissions {
    pub fn owner() -> Self {
        Self {
            is_owner: true,
            can_edit: true,
            can_view: true,
        }
    }

    pub fn shared(level: PermissionLevel) -> Self {
        Self {
            is_owner: false,
            can_edit: level == PermissionLevel::Edit,
            can_view: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}
