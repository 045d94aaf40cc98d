//! Mile Planner Shared Library
//!
//! Domain core of the training planner: the workout catalog, the twelve-week
//! schedule and its mutations, completion, history queries, calendar
//! projection and markdown export. Nothing in this crate performs I/O; the
//! backend and the WASM module supply stores and inputs explicitly.

pub mod calendar;
pub mod catalog;
pub mod completion;
pub mod errors;
pub mod export;
pub mod history;
pub mod models;
pub mod reconcile;
pub mod schedule;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use catalog::{Catalog, Resolved, UNKNOWN_WORKOUT};
pub use completion::{complete_instance, CompletionData, CompletionPolicy, PendingCompletion};
pub use errors::*;
pub use history::HistoryLog;
pub use models::*;
pub use schedule::{week_index, Schedule, TransferPayload, WEEKS_PER_SCHEDULE};
