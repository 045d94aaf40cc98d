//! Markdown export of schedules and the history journal

use crate::calendar::{day_label, format_short_date, week_start};
use crate::catalog::Catalog;
use crate::history::HistoryLog;
use crate::models::WeekSlot;
use crate::schedule::Schedule;
use chrono::NaiveDate;

pub const HISTORY_EXPORT_FILE: &str = "workout-history.md";

/// Download name for a schedule export, e.g. `spring-mile-training-schedule.md`
pub fn export_file_name(schedule_name: &str) -> String {
    let mut slug = String::new();
    for ch in schedule_name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "training-schedule.md".to_string()
    } else {
        format!("{}-training-schedule.md", slug)
    }
}

fn push_week(out: &mut String, week: &WeekSlot, schedule: &Schedule, catalog: &Catalog, history: &HistoryLog) {
    out.push_str(&format!("## Week {}", week.week_number));
    if let Some(start) = week_start(week.week_number, schedule.start_date()) {
        out.push_str(&format!(": {}", start));
    }
    out.push_str("\n\n");

    if week.has_mileage() {
        out.push_str(&format!(
            "**Mileage:** goal {} / actual {}\n\n",
            week.mileage_goal.as_deref().unwrap_or("-"),
            week.actual_mileage.as_deref().unwrap_or("-"),
        ));
    }

    for (index, instance) in week.workouts.iter().enumerate() {
        let resolved = catalog.resolve(&instance.original_id);
        out.push_str(&format!(
            "### {}: {} ({})\n",
            day_label(index),
            resolved.nickname(),
            resolved.name()
        ));

        let definition = resolved.definition();
        out.push_str(&format!(
            "**Description:** {}\n\n",
            definition.map(|d| d.description.as_str()).unwrap_or_default()
        ));
        out.push_str(&format!(
            "**Rx:** {}\n\n",
            definition.map(|d| d.rx.as_str()).unwrap_or_default()
        ));

        if let Some(last) = history.last_performance_for(&instance.original_id) {
            out.push_str(&format!(
                "**Recent Performance:** Last run {} - Rating: {}/10\n\n",
                last.date, last.rating
            ));
        }

        if instance.completed {
            match instance.completed_date {
                Some(date) => out.push_str(&format!("**Completed:** {}\n\n", date)),
                None => out.push_str("**Completed:** yes\n\n"),
            }
            if let Some(notes) = instance.completed_notes.as_deref().filter(|n| !n.is_empty()) {
                out.push_str(&format!("**Notes:** {}\n\n", notes));
            }
        }

        out.push_str("---\n\n");
    }
}

/// Render a schedule; weeks with no workouts and no mileage are skipped
pub fn schedule_to_markdown(
    schedule: &Schedule,
    catalog: &Catalog,
    history: &HistoryLog,
    generated_on: NaiveDate,
) -> String {
    let mut out = format!("# {}\n\n", schedule.name());
    out.push_str(&format!("Generated on {}\n\n", format_short_date(generated_on)));

    for week in schedule.weeks().iter().filter(|w| !w.is_blank()) {
        push_week(&mut out, week, schedule, catalog, history);
    }
    out
}

/// Render the journal, newest entry first
pub fn history_to_markdown(history: &HistoryLog, catalog: &Catalog, generated_on: NaiveDate) -> String {
    let mut out = String::from("# Workout History\n\n");
    out.push_str(&format!("Generated on {}\n\n", format_short_date(generated_on)));

    if history.is_empty() {
        out.push_str("No workouts logged yet.\n");
        return out;
    }

    for entry in history.all_newest_first() {
        let resolved = catalog.resolve(&entry.workout_id);
        out.push_str(&format!(
            "## {}: {} ({})\n\n",
            format_short_date(entry.date),
            resolved.nickname(),
            resolved.name()
        ));
        out.push_str(&format!("**Rating:** {}/10\n\n", entry.rating));
        if !entry.target_times.is_empty() {
            out.push_str(&format!("**Target Times:** {}\n\n", entry.target_times.join(", ")));
        }
        if !entry.actual_times.is_empty() {
            out.push_str(&format!("**Actual Times:** {}\n\n", entry.actual_times.join(", ")));
        }
        for (label, value) in [
            ("Weather", &entry.weather),
            ("Location", &entry.location),
            ("Notes", &entry.notes),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                out.push_str(&format!("**{}:** {}\n\n", label, value));
            }
        }
        out.push_str("---\n\n");
    }
    out
}
