//! Input validation
//!
//! Checks run before an action is allowed. A failure names the offending
//! field and leaves every store untouched.

use crate::errors::ValidationError;
use crate::models::{HistoryUpdate, NewHistoryEntry, NewWorkout, WorkoutUpdate};
use crate::schedule::WEEKS_PER_SCHEDULE;
use once_cell::sync::Lazy;
use regex_lite::Regex;

pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TEXT_LEN: usize = 2000;
pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 10;

const WORKOUT_ID_PATTERN: &str = r"^[a-z0-9][a-z0-9_-]{0,63}$";

static WORKOUT_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(WORKOUT_ID_PATTERN).expect("workout id pattern is valid"));

/// Catalog ids are short lowercase slugs such as `p1` or `hill-repeats`
pub fn validate_workout_id(id: &str) -> Result<(), ValidationError> {
    if !WORKOUT_ID_RE.is_match(id) {
        return Err(ValidationError::new(
            "workout_id",
            "must be 1-64 lowercase letters, digits, '-' or '_'",
        ));
    }
    Ok(())
}

/// Non-blank text no longer than `max` characters
pub fn require_text(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    check_length(field, value, max)
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(field, format!("must be at most {} characters", max)));
    }
    Ok(())
}

/// 1-based week number within a schedule
pub fn validate_week_number(week_number: u32) -> Result<(), ValidationError> {
    if week_number == 0 || week_number as usize > WEEKS_PER_SCHEDULE {
        return Err(ValidationError::new(
            "week",
            format!("must be between 1 and {}", WEEKS_PER_SCHEDULE),
        ));
    }
    Ok(())
}

pub fn validate_rating(rating: i32) -> Result<(), ValidationError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(ValidationError::new(
            "rating",
            format!("must be between {} and {}", MIN_RATING, MAX_RATING),
        ));
    }
    Ok(())
}

pub fn validate_new_workout(input: &NewWorkout) -> Result<(), ValidationError> {
    validate_workout_id(&input.id)?;
    require_text("category", &input.category, 64)?;
    require_text("name", &input.name, MAX_NAME_LEN)?;
    require_text("nickname", &input.nickname, MAX_NAME_LEN)?;
    check_length("description", &input.description, MAX_TEXT_LEN)?;
    check_length("rx", &input.rx, MAX_TEXT_LEN)
}

pub fn validate_workout_update(update: &WorkoutUpdate) -> Result<(), ValidationError> {
    if update.is_empty() {
        return Err(ValidationError::new("workout", "no changes supplied"));
    }
    if let Some(category) = &update.category {
        require_text("category", category, 64)?;
    }
    if let Some(name) = &update.name {
        require_text("name", name, MAX_NAME_LEN)?;
    }
    if let Some(nickname) = &update.nickname {
        require_text("nickname", nickname, MAX_NAME_LEN)?;
    }
    if let Some(description) = &update.description {
        check_length("description", description, MAX_TEXT_LEN)?;
    }
    if let Some(rx) = &update.rx {
        check_length("rx", rx, MAX_TEXT_LEN)?;
    }
    Ok(())
}

fn check_optional_texts(fields: [(&'static str, Option<&str>); 3]) -> Result<(), ValidationError> {
    for (field, value) in fields {
        if let Some(value) = value {
            check_length(field, value, MAX_TEXT_LEN)?;
        }
    }
    Ok(())
}

/// History form input: a workout must be chosen and the rating in range
pub fn validate_history_entry(entry: &NewHistoryEntry) -> Result<(), ValidationError> {
    if entry.workout_id.trim().is_empty() {
        return Err(ValidationError::new("workout_id", "select a workout"));
    }
    validate_rating(entry.rating)?;
    check_optional_texts([
        ("notes", entry.notes.as_deref()),
        ("weather", entry.weather.as_deref()),
        ("location", entry.location.as_deref()),
    ])
}

pub fn validate_history_update(update: &HistoryUpdate) -> Result<(), ValidationError> {
    if let Some(rating) = update.rating {
        validate_rating(rating)?;
    }
    check_optional_texts([
        ("notes", update.notes.as_deref()),
        ("weather", update.weather.as_deref()),
        ("location", update.location.as_deref()),
    ])
}
