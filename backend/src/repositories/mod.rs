//! Database repositories
//!
//! Provides data access layer for database operations.

pub mod account;
pub mod catalog;
pub mod history;
pub mod schedule;
pub mod share;

pub use account::{AccountRecord, AccountRepository};
pub use catalog::{CatalogRepository, CategoryRecord, VersionRecord, WorkoutRecord};
pub use history::{HistoryRecord, HistoryRepository};
pub use schedule::{
    PlacementRecord, ScheduleListRecord, ScheduleRecord, ScheduleRepository, WeekRecord,
};
pub use share::{ShareRecord, ShareRepository};
