//! API request and response types

use crate::completion::CompletionData;
use crate::history::split_times;
use crate::models::{
    HistoryEntry, HistoryUpdate, MileageField, NewHistoryEntry, PermissionLevel, SchedulePermissions,
    WorkoutUpdate,
};
use crate::reconcile::AnnotatedSchedule;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// A list of split times, accepted either as an array or as comma-separated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimesInput {
    List(Vec<String>),
    Text(String),
}

impl Default for TimesInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl TimesInput {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::List(items) => items
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
            Self::Text(text) => split_times(&text),
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWorkoutRequest {
    #[serde(flatten)]
    pub changes: WorkoutUpdate,
    #[serde(default)]
    pub edit_reason: Option<String>,
}

// ============================================================================
// Schedules
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

/// Header edit; `clear_start_date` removes the start date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateScheduleRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_start_date: bool,
}

/// Row in the schedule list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub id: Uuid,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub owner_id: Uuid,
    pub is_owner: bool,
    pub permission: Option<PermissionLevel>,
    pub updated_at: DateTime<Utc>,
}

/// A schedule annotated for display, with the caller's access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDetail {
    pub id: Uuid,
    #[serde(flatten)]
    pub schedule: AnnotatedSchedule,
    pub permissions: SchedulePermissions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveWorkoutRequest {
    /// 1-based destination week
    pub to_week: u32,
    /// Destination position, clamped to the week's length
    pub to_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMileageRequest {
    pub field: MileageField,
    #[serde(default)]
    pub value: String,
}

/// Result of a placement mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementResponse {
    pub week: u32,
    pub index: usize,
    pub schedule: ScheduleDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteWorkoutRequest {
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub actual_times: TimesInput,
    #[serde(default)]
    pub target_times: TimesInput,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub rating: i32,
}

impl From<CompleteWorkoutRequest> for CompletionData {
    fn from(req: CompleteWorkoutRequest) -> Self {
        Self {
            date: req.date,
            notes: req.notes,
            actual_times: req.actual_times.into_vec(),
            target_times: req.target_times.into_vec(),
            weather: req.weather,
            location: req.location,
            rating: req.rating,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub entry: HistoryEntry,
    pub schedule: ScheduleDetail,
}

// ============================================================================
// History
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHistoryRequest {
    pub workout_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub actual_times: TimesInput,
    #[serde(default)]
    pub target_times: TimesInput,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub rating: i32,
}

impl From<CreateHistoryRequest> for NewHistoryEntry {
    fn from(req: CreateHistoryRequest) -> Self {
        Self {
            workout_id: req.workout_id,
            date: req.date,
            actual_times: req.actual_times.into_vec(),
            target_times: req.target_times.into_vec(),
            notes: req.notes,
            weather: req.weather,
            location: req.location,
            rating: req.rating,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHistoryRequest {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_times: Option<TimesInput>,
    #[serde(default)]
    pub target_times: Option<TimesInput>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub rating: Option<i32>,
}

impl From<UpdateHistoryRequest> for HistoryUpdate {
    fn from(req: UpdateHistoryRequest) -> Self {
        Self {
            date: req.date,
            actual_times: req.actual_times.map(TimesInput::into_vec),
            target_times: req.target_times.map(TimesInput::into_vec),
            notes: req.notes,
            weather: req.weather,
            location: req.location,
            rating: req.rating,
        }
    }
}

// ============================================================================
// Sharing
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ShareScheduleRequest {
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub permission: PermissionLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareResponse {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub account_id: Uuid,
    pub email: Option<String>,
    pub permission: PermissionLevel,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_times_accepts_text_or_list() {
        let text: TimesInput = serde_json::from_str("\"69.5, 70.1,, \"").unwrap();
        assert_eq!(text.into_vec(), vec!["69.5", "70.1"]);

        let list: TimesInput = serde_json::from_str(r#"["3:12", " "]"#).unwrap();
        assert_eq!(list.into_vec(), vec!["3:12"]);
    }

    #[test]
    fn test_complete_request_defaults() {
        let req: CompleteWorkoutRequest =
            serde_json::from_str(r#"{"date":"2025-01-10","rating":8}"#).unwrap();
        let data = CompletionData::from(req);
        assert_eq!(data.rating, 8);
        assert!(data.actual_times.is_empty());
        assert!(data.notes.is_none());
    }

    #[test]
    fn test_share_request_email() {
        let ok = ShareScheduleRequest {
            email: "coach@example.com".to_string(),
            permission: PermissionLevel::Edit,
        };
        assert!(ok.validate().is_ok());

        let bad = ShareScheduleRequest {
            email: "not-an-email".to_string(),
            permission: PermissionLevel::View,
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_update_workout_request_flattens() {
        let req: UpdateWorkoutRequest =
            serde_json::from_str(r#"{"rx":"400s @66s","edit_reason":"faster"}"#).unwrap();
        assert_eq!(req.changes.rx.as_deref(), Some("400s @66s"));
        assert!(req.changes.name.is_none());
        assert_eq!(req.edit_reason.as_deref(), Some("faster"));
    }
}
