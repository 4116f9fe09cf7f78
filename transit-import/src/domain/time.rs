//! Schedule time values.
//!
//! Schedule documents carry run times as ISO 8601 durations (`PT2M30S`),
//! clock times as `HH:MM:SS` and dates as `YYYY-MM-DD`.

use chrono::{Duration, NaiveDate, NaiveTime};

/// Error returned when parsing an invalid time, duration or date string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse an ISO 8601 duration such as `PT1H5M`, `PT90S` or `P1DT2H`.
///
/// Day and week designators are accepted before `T`; hours, minutes and
/// seconds after it. Fractional values are truncated to whole seconds.
///
/// # Examples
///
/// ```
/// use transit_import::domain::parse_iso_duration;
///
/// assert_eq!(parse_iso_duration("PT2M").unwrap().num_seconds(), 120);
/// assert_eq!(parse_iso_duration("PT1M30S").unwrap().num_seconds(), 90);
/// assert!(parse_iso_duration("2M").is_err());
/// ```
pub fn parse_iso_duration(s: &str) -> Result<Duration, TimeError> {
    let rest = s
        .strip_prefix('P')
        .ok_or_else(|| TimeError::new("duration must start with P"))?;

    let mut seconds = 0i64;
    let mut in_time = false;
    let mut saw_component = false;
    let mut number = String::new();

    for c in rest.chars() {
        match c {
            'T' if !in_time && number.is_empty() => in_time = true,
            '0'..='9' | '.' => number.push(c),
            unit => {
                if number.is_empty() {
                    return Err(TimeError::new("missing value before unit"));
                }
                let value: f64 = number
                    .parse()
                    .map_err(|_| TimeError::new("invalid duration value"))?;
                let scale = match (in_time, unit) {
                    (false, 'W') => 604_800.0,
                    (false, 'D') => 86_400.0,
                    (true, 'H') => 3_600.0,
                    (true, 'M') => 60.0,
                    (true, 'S') => 1.0,
                    _ => return Err(TimeError::new("unsupported duration designator")),
                };
                let component = value * scale;
                if !component.is_finite() || component >= i64::MAX as f64 {
                    return Err(TimeError::new("duration out of range"));
                }
                seconds = seconds
                    .checked_add(component as i64)
                    .ok_or_else(|| TimeError::new("duration out of range"))?;
                number.clear();
                saw_component = true;
            }
        }
    }

    if !number.is_empty() {
        return Err(TimeError::new("value without designator"));
    }
    if !saw_component {
        return Err(TimeError::new("duration has no components"));
    }

    Duration::try_seconds(seconds).ok_or_else(|| TimeError::new("duration out of range"))
}

/// Parse a clock time in `HH:MM:SS` or `HH:MM` form.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime, TimeError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| TimeError::new("expected HH:MM:SS or HH:MM"))
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| TimeError::new("expected YYYY-MM-DD"))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Hour/minute/second components add up
        #[test]
        fn hms_components(h in 0i64..48, m in 0i64..60, s in 0i64..60) {
            let text = format!("PT{h}H{m}M{s}S");
            let parsed = parse_iso_duration(&text).unwrap();
            prop_assert_eq!(parsed.num_seconds(), h * 3600 + m * 60 + s);
        }
    }
}
