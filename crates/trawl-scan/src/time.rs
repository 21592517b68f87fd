//! Timestamp parsing, date expressions, and display formatting.
//!
//! Anything unparseable becomes `None`; callers drop it from date-sensitive
//! comparisons instead of failing.

use chrono::{DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::sync::OnceLock;

/// Parse an ISO 8601 timestamp. A trailing `Z` means UTC; timestamps without
/// any offset are taken as UTC as well.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<FixedOffset>> {
    let normalized = match ts.strip_suffix('Z') {
        Some(rest) => format!("{rest}+00:00"),
        None => ts.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Format a timestamp for display, e.g. `Jan 05, 2024, 3:07 PM`.
pub fn format_timestamp(dt: &DateTime<FixedOffset>) -> String {
    dt.format("%b %d, %Y, %-I:%M %p").to_string()
}

/// Format a duration in seconds: `42s`, `17m`, `2h`, `2h 5m`.
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{}s", seconds as i64)
    } else if seconds < 3600.0 {
        format!("{}m", (seconds / 60.0) as i64)
    } else {
        let hours = (seconds / 3600.0) as i64;
        let minutes = ((seconds % 3600.0) / 60.0) as i64;
        if minutes > 0 {
            format!("{hours}h {minutes}m")
        } else {
            format!("{hours}h")
        }
    }
}

/// Seconds between two timestamps, fractional part kept.
pub fn seconds_between(start: &DateTime<FixedOffset>, end: &DateTime<FixedOffset>) -> f64 {
    let delta = end.signed_duration_since(*start);
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

fn days_ago_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*days?\s*ago").expect("valid regex"))
}

fn weeks_ago_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*weeks?\s*ago").expect("valid regex"))
}

/// Resolve a date expression relative to `today`.
///
/// Recognizes `today`, `yesterday`, `last week` (7 days), `last month`
/// (30 days), `N days ago`, `N weeks ago`, then the absolute forms
/// `YYYY-MM-DD`, `MM/DD/YYYY`, `MM/DD`, `Mon DD`, `Month DD`. Forms without
/// a year use the year of `today`.
pub fn resolve_date(expr: &str, today: NaiveDate) -> Option<NaiveDate> {
    let expr = expr.trim().to_lowercase();

    match expr.as_str() {
        "today" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        "last week" => return today.checked_sub_days(Days::new(7)),
        "last month" => return today.checked_sub_days(Days::new(30)),
        _ => {}
    }

    if let Some(caps) = days_ago_re().captures(&expr) {
        let days: u64 = caps[1].parse().ok()?;
        return today.checked_sub_days(Days::new(days));
    }
    if let Some(caps) = weeks_ago_re().captures(&expr) {
        let weeks: u64 = caps[1].parse().ok()?;
        return today.checked_sub_days(Days::new(weeks.checked_mul(7)?));
    }

    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&expr, fmt) {
            return Some(date);
        }
    }
    let with_year = format!("{expr} {}", today.year());
    for fmt in ["%m/%d %Y", "%b %d %Y", "%B %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&with_year, fmt) {
            return Some(date);
        }
    }

    None
}

/// Local midnight at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        .map(DateTime::<FixedOffset>::from)
}

/// Resolve a date expression against the local calendar to the start of
/// that day.
pub fn parse_date_expr(expr: &str) -> Option<DateTime<FixedOffset>> {
    resolve_date(expr, Local::now().date_naive()).and_then(start_of_day)
}
