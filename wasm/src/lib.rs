//! Mile Planner WASM Module
//!
//! Browser bindings over the shared planner core, so the client renders
//! calendar labels and markdown downloads exactly as the server does.

use chrono::NaiveDate;
use mile_planner_shared::{calendar, export, history, Catalog, HistoryLog, Schedule};
use wasm_bindgen::prelude::*;

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

fn from_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {}: {}", what, e))
}

/// "Jan 5, 2025" style label for the first day of a 1-based week
///
/// Returns `undefined` without a valid ISO start date.
#[wasm_bindgen]
pub fn week_start_label(week_number: u32, start_date: &str) -> Option<String> {
    calendar::week_start(week_number, parse_date(start_date))
}

/// Training day for a 0-based position within a week
#[wasm_bindgen]
pub fn day_label(index: usize) -> String {
    calendar::day_label(index)
}

#[wasm_bindgen]
pub fn export_file_name(schedule_name: &str) -> String {
    export::export_file_name(schedule_name)
}

/// Split comma-separated split times; returns a JSON array of strings
#[wasm_bindgen]
pub fn split_times(text: &str) -> String {
    serde_json::to_string(&history::split_times(text)).unwrap_or_else(|_| "[]".to_string())
}

fn render_schedule(
    schedule_json: &str,
    catalog_json: &str,
    history_json: &str,
    generated_on: &str,
) -> Result<String, String> {
    let schedule: Schedule = from_json("schedule", schedule_json)?;
    let catalog: Catalog = from_json("catalog", catalog_json)?;
    let history: HistoryLog = from_json("history", history_json)?;
    let today = parse_date(generated_on).ok_or_else(|| format!("Invalid date: {}", generated_on))?;
    Ok(export::schedule_to_markdown(&schedule, &catalog, &history, today))
}

/// Render a schedule to markdown from its JSON form
#[wasm_bindgen]
pub fn schedule_markdown(
    schedule_json: &str,
    catalog_json: &str,
    history_json: &str,
    generated_on: &str,
) -> Result<String, JsError> {
    render_schedule(schedule_json, catalog_json, history_json, generated_on)
        .map_err(|e| JsError::new(&e))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn schedule_markdown_throws_on_malformed_json() {
        assert!(schedule_markdown("not json", "[]", "[]", "2025-03-01").is_err());
    }

    #[wasm_bindgen_test]
    fn schedule_markdown_renders_empty_schedule() {
        let schedule = serde_json::to_string(&Schedule::new("Base")).unwrap();
        let catalog = serde_json::to_string(&Catalog::seeded()).unwrap();
        let markdown = schedule_markdown(&schedule, &catalog, "[]", "2025-03-01").unwrap();
        assert!(markdown.starts_with("# Base"));
        assert!(!markdown.contains("## Week"));
    }
}
