use crate::models::{Macro, MacroEntry, SummaryRow, TARGET_BAND, WeekOption, WeeklySummary};
use chrono::{Datelike, Duration, NaiveDate};

/// Monday that opens the calendar week containing `date`.
pub fn week_key(date: NaiveDate) -> NaiveDate {
    // Only the partial first week of chrono's range has no Monday; it shares one bucket.
    checked_week_key(date).unwrap_or(NaiveDate::MIN)
}

pub fn checked_week_key(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_signed(Duration::days(date.weekday().num_days_from_monday() as i64))
}

/// Distinct week keys present in the log, most recent first.
pub fn available_weeks(entries: &[MacroEntry]) -> Vec<NaiveDate> {
    let mut weeks: Vec<NaiveDate> = entries.iter().map(|entry| week_key(entry.date)).collect();
    weeks.sort_unstable_by(|a, b| b.cmp(a));
    weeks.dedup();
    weeks
}

pub fn week_options(entries: &[MacroEntry]) -> Vec<WeekOption> {
    available_weeks(entries)
        .into_iter()
        .map(|week_start| WeekOption {
            week_start,
            label: week_label(week_start),
        })
        .collect()
}

/// Rows belonging to `week`, kept in log order.
pub fn week_entries(entries: &[MacroEntry], week: NaiveDate) -> Vec<MacroEntry> {
    entries
        .iter()
        .filter(|entry| week_key(entry.date) == week)
        .copied()
        .collect()
}

pub fn summarize(entries: &[MacroEntry], week: NaiveDate) -> WeeklySummary {
    let days = week_entries(entries, week);
    let rows = Macro::ALL
        .into_iter()
        .map(|kind| summarize_macro(&days, kind))
        .collect();

    WeeklySummary {
        week_start: week,
        days_logged: days.len(),
        rows,
    }
}

fn summarize_macro(days: &[MacroEntry], kind: Macro) -> SummaryRow {
    let values: Vec<u32> = days.iter().map(|entry| entry.value(kind)).collect();
    if values.is_empty() {
        return SummaryRow {
            name: kind,
            average: None,
            min: None,
            max: None,
            days_in_target: None,
        };
    }

    let total: u64 = values.iter().map(|&value| u64::from(value)).sum();
    let average = total as f64 / values.len() as f64;
    let in_target = values
        .iter()
        .filter(|&&value| TARGET_BAND.contains(&value))
        .count() as u32;

    SummaryRow {
        name: kind,
        average: Some(round_one(average)),
        min: values.iter().min().map(|&v| round_one(f64::from(v))),
        max: values.iter().max().map(|&v| round_one(f64::from(v))),
        days_in_target: Some(in_target),
    }
}

pub fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Human-readable week label, e.g. `Mar 02, 2026`.
pub fn week_label(week: NaiveDate) -> String {
    week.format("%b %d, %Y").to_string()
}

/// Filename-safe week stamp, e.g. `2026_03_02`.
pub fn week_stamp(week: NaiveDate) -> String {
    week.format("%Y_%m_%d").to_string()
}

/// Parses a `?week=` value, rejecting dates whose Monday is out of range.
pub fn parse_week(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .filter(|date| checked_week_key(*date).is_some())
}

/// Renders a derived figure for display; missing data stays visibly missing.
pub fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(value) if value.fract() == 0.0 => format!("{value:.0}"),
        Some(value) => format!("{value:.1}"),
        None => "No data".to_string(),
    }
}
