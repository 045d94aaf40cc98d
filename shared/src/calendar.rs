//! Week-to-calendar projection

use chrono::{Duration, NaiveDate};

/// Calendar date on which a 1-based week begins
pub fn week_start_date(week_number: u32, start: Option<NaiveDate>) -> Option<NaiveDate> {
    let start = start?;
    let offset = i64::from(week_number.checked_sub(1)?) * 7;
    start.checked_add_signed(Duration::days(offset))
}

/// US-English short date, e.g. `Jan 5, 2025`
pub fn format_short_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Formatted start date of a 1-based week
pub fn week_start(week_number: u32, start: Option<NaiveDate>) -> Option<String> {
    week_start_date(week_number, start).map(format_short_date)
}

/// Training day inferred from a workout's position in its week
pub fn day_label(index: usize) -> String {
    match index {
        0 => "Tuesday".to_string(),
        1 => "Friday".to_string(),
        n => format!("Day {}", n + 1),
    }
}
