//! Error types for the Mile Planner domain core

use thiserror::Error;

/// Errors raised by schedule mutations that cannot be silently ignored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Week index {0} is out of range")]
    WeekOutOfRange(usize),

    #[error("No workout at position {index} in week {week}")]
    InstanceOutOfRange { week: u32, index: usize },

    #[error("Unknown workout: {0}")]
    UnknownWorkout(String),

    #[error("Workout is already marked completed")]
    AlreadyCompleted,

    #[error("Scheduled workout {0} no longer exists")]
    InstanceMissing(String),

    #[error("A schedule must have exactly {expected} weeks, got {actual}")]
    WrongWeekCount { expected: usize, actual: usize },

    #[error("Week number {0} is missing or duplicated")]
    InvalidWeekNumber(u32),

    #[error("Scheduled workout {0} appears more than once")]
    DuplicateInstance(String),
}

/// A required field was missing or malformed before an action was allowed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failure of the two-phase completion flow
///
/// `Persist` carries whatever error the store returned. The schedule is
/// guaranteed to hold the instance as not completed when either variant is
/// returned.
#[derive(Error, Debug)]
pub enum CompletionError<E> {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Failed to record completion: {0}")]
    Persist(E),
}
