//! History log queries
//!
//! Entries are ordered newest first by date; entries on the same date are
//! ordered by id descending so repeated queries agree.

use crate::models::{HistoryEntry, HistoryUpdate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

/// Journal ordering: date descending, then id descending
pub fn newest_first(a: &HistoryEntry, b: &HistoryEntry) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

/// In-memory set of history entries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Apply an edit in place; returns false when no entry has that id
    pub fn update(&mut self, id: Uuid, changes: HistoryUpdate) -> bool {
        match self.entries.iter().position(|e| e.id == id) {
            Some(pos) => {
                let current = self.entries.remove(pos);
                self.entries.insert(pos, current.with_update(changes));
                true
            }
            None => false,
        }
    }

    /// Every entry for one workout, newest first
    pub fn history_for(&self, workout_id: &str) -> Vec<&HistoryEntry> {
        let mut found: Vec<&HistoryEntry> = self
            .entries
            .iter()
            .filter(|e| e.workout_id == workout_id)
            .collect();
        found.sort_by(|a, b| newest_first(a, b));
        found
    }

    /// Most recent entry for one workout
    pub fn last_performance_for(&self, workout_id: &str) -> Option<&HistoryEntry> {
        self.entries
            .iter()
            .filter(|e| e.workout_id == workout_id)
            .min_by(|a, b| newest_first(a, b))
    }

    pub fn all_newest_first(&self) -> Vec<&HistoryEntry> {
        let mut all: Vec<&HistoryEntry> = self.entries.iter().collect();
        all.sort_by(|a, b| newest_first(a, b));
        all
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }
}

impl FromIterator<HistoryEntry> for HistoryLog {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Split a comma-separated list of times, dropping blank pieces
pub fn split_times(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn entry(id: u128, workout_id: &str, date: (i32, u32, u32), rating: i32) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::from_u128(id),
            workout_id: workout_id.to_string(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            actual_times: vec![],
            target_times: vec![],
            notes: None,
            weather: None,
            location: None,
            rating,
        }
    }

    #[test]
    fn test_history_for_orders_by_date_then_id() {
        let log: HistoryLog = vec![
            entry(1, "p1", (2025, 1, 3), 5),
            entry(2, "s1", (2025, 1, 9), 6),
            entry(3, "p1", (2025, 1, 10), 7),
            entry(4, "p1", (2025, 1, 10), 9),
        ]
        .into_iter()
        .collect();

        let ids: Vec<u128> = log.history_for("p1").iter().map(|e| e.id.as_u128()).collect();
        assert_eq!(ids, vec![4, 3, 1]);
        assert_eq!(log.last_performance_for("p1").unwrap().rating, 9);
    }

    #[test]
    fn test_last_performance_missing() {
        let log = HistoryLog::new(vec![entry(1, "p1", (2025, 1, 3), 5)]);
        assert!(log.last_performance_for("s4").is_none());
        assert!(log.history_for("s4").is_empty());
    }

    #[test]
    fn test_update_in_place() {
        let mut log = HistoryLog::new(vec![entry(1, "p1", (2025, 1, 3), 5)]);
        let changed = log.update(
            Uuid::from_u128(1),
            HistoryUpdate {
                rating: Some(8),
                notes: Some("Felt smooth".to_string()),
                ..Default::default()
            },
        );
        assert!(changed);
        let updated = log.get(Uuid::from_u128(1)).unwrap();
        assert_eq!(updated.rating, 8);
        assert_eq!(updated.notes.as_deref(), Some("Felt smooth"));
        assert_eq!(updated.workout_id, "p1");

        assert!(!log.update(Uuid::from_u128(99), HistoryUpdate::default()));
    }

    #[test]
    fn test_split_times() {
        assert_eq!(split_times("69.5, 3:12.0,,  "), vec!["69.5", "3:12.0"]);
        assert!(split_times("").is_empty());
        assert!(split_times(" , ").is_empty());
    }

    fn arb_entry() -> impl Strategy<Value = HistoryEntry> {
        (any::<u128>(), prop_oneof!["p1", "p2", "s1"], 1u32..=28, 1i32..=10)
            .prop_map(|(id, workout, day, rating)| entry(id, &workout, (2025, 2, day), rating))
    }

    proptest! {
        #[test]
        fn history_for_is_idempotent(entries in prop::collection::vec(arb_entry(), 0..20)) {
            let log = HistoryLog::new(entries);
            let before = log.clone();
            let first: Vec<HistoryEntry> = log.history_for("p1").into_iter().cloned().collect();
            let second: Vec<HistoryEntry> = log.history_for("p1").into_iter().cloned().collect();
            prop_assert_eq!(first, second);
            prop_assert_eq!(log, before);
        }

        #[test]
        fn last_performance_has_max_date(entries in prop::collection::vec(arb_entry(), 1..20)) {
            let log = HistoryLog::new(entries.clone());
            let max_date = entries.iter().filter(|e| e.workout_id == "p1").map(|e| e.date).max();
            let last = log.last_performance_for("p1").map(|e| e.date);
            prop_assert_eq!(last, max_date);
            prop_assert_eq!(
                log.last_performance_for("p1"),
                log.history_for("p1").first().copied()
            );
        }
    }
}
