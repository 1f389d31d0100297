//! Spoken time-expression resolution.
//!
//! # Responsibility
//! - Resolve "tomorrow [at] H[:MM][am|pm]" and "in N hours|minutes" to
//!   concrete local timestamps.
//!
//! # Invariants
//! - Never fails; unrecognized input falls back to tomorrow 09:00.
//! - 12-hour disambiguation: 12pm stays 12, 12am becomes 0.

use chrono::{DateTime, Duration, Local, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

/// Default wall-clock hour used when no explicit time is present.
const DEFAULT_HOUR: u32 = 9;

static RELATIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d+)\s+(hours?|minutes?)\b").expect("valid relative regex"));
static AMPM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,2})(?::(\d{2}))?\s*(am|pm)\b").expect("valid am/pm regex")
});
static CLOCK24_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").expect("valid 24h clock regex"));

/// Resolves a spoken time expression against the given reference instant.
pub fn parse_time_at(text: &str, now: DateTime<Local>) -> DateTime<Local> {
    let lower = text.trim().to_lowercase();

    if let Some(caps) = RELATIVE_RE.captures(&lower) {
        let amount: i64 = caps[1].parse().unwrap_or(0);
        let delta = if caps[2].starts_with("hour") {
            Duration::hours(amount)
        } else {
            Duration::minutes(amount)
        };
        return now + delta;
    }

    let tomorrow = now + Duration::days(1);
    if lower.contains("tomorrow") {
        let (hour, minute) = clock_time(&lower).unwrap_or((DEFAULT_HOUR, 0));
        return at_clock(tomorrow, hour, minute);
    }

    at_clock(tomorrow, DEFAULT_HOUR, 0)
}

/// Convenience wrapper over [`parse_time_at`] anchored to the current time.
pub fn parse_time(text: &str) -> DateTime<Local> {
    parse_time_at(text, Local::now())
}

fn clock_time(lower: &str) -> Option<(u32, u32)> {
    if let Some(caps) = AMPM_RE.captures(lower) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        match &caps[3] {
            "pm" if hour != 12 => hour += 12,
            "am" if hour == 12 => hour = 0,
            _ => {}
        }
        if hour <= 23 && minute <= 59 {
            return Some((hour, minute));
        }
        return None;
    }

    if let Some(caps) = CLOCK24_RE.captures(lower) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps[2].parse().ok()?;
        if hour <= 23 && minute <= 59 {
            return Some((hour, minute));
        }
    }

    None
}

fn at_clock(base: DateTime<Local>, hour: u32, minute: u32) -> DateTime<Local> {
    base.with_hour(hour)
        .and_then(|time| time.with_minute(minute))
        .and_then(|time| time.with_second(0))
        .and_then(|time| time.with_nanosecond(0))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::parse_time_at;
    use chrono::{Duration, Local, TimeZone, Timelike};

    fn reference() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 10, 14, 30, 0).unwrap()
    }

    #[test]
    fn tomorrow_with_pm_clock_resolves_to_next_day_afternoon() {
        let resolved = parse_time_at("tomorrow 3pm", reference());
        assert_eq!(resolved.date_naive(), reference().date_naive() + Duration::days(1));
        assert_eq!(resolved.hour(), 15);
        assert_eq!(resolved.minute(), 0);
        assert_eq!(resolved.second(), 0);
    }

    #[test]
    fn twelve_pm_stays_twelve_and_twelve_am_becomes_zero() {
        assert_eq!(parse_time_at("tomorrow at 12pm", reference()).hour(), 12);
        assert_eq!(parse_time_at("tomorrow at 12am", reference()).hour(), 0);
    }

    #[test]
    fn relative_hours_offset_from_reference() {
        let resolved = parse_time_at("in 2 hours", reference());
        assert_eq!(resolved, reference() + Duration::hours(2));
    }

    #[test]
    fn relative_minutes_offset_from_reference() {
        let resolved = parse_time_at("in 45 minutes", reference());
        assert_eq!(resolved, reference() + Duration::minutes(45));
    }

    #[test]
    fn unrecognized_text_falls_back_to_tomorrow_morning() {
        let resolved = parse_time_at("gibberish", reference());
        assert_eq!(resolved.date_naive(), reference().date_naive() + Duration::days(1));
        assert_eq!(resolved.hour(), 9);
        assert_eq!(resolved.minute(), 0);
    }

    #[test]
    fn tomorrow_without_clock_defaults_to_nine() {
        let resolved = parse_time_at("tomorrow", reference());
        assert_eq!(resolved.hour(), 9);
    }

    #[test]
    fn tomorrow_with_half_hour_clock() {
        let resolved = parse_time_at("tomorrow at 7:30 pm", reference());
        assert_eq!(resolved.hour(), 19);
        assert_eq!(resolved.minute(), 30);
    }
}
