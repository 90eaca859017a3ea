//! Utility functions for the spotlight service

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Generate a correlation id for one handled trigger
pub fn generate_request_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Timestamp `days` days before `now`
pub fn days_ago(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

/// Round to one decimal place, half away from zero
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// `part / whole * 100`, or exactly 0 when `whole` is 0
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Render a percentage the way the chat texts show it: `0` for nothing,
/// one decimal otherwise
pub fn format_percent(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{:.1}", value)
    }
}
