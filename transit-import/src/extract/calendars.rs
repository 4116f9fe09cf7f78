//! Service calendar extraction.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::domain::{ServiceCalendar, parse_date};
use crate::txc;

fn parse_optional_date(value: Option<&str>, field: &'static str) -> Option<NaiveDate> {
    let value = value?;
    parse_date(value)
        .inspect_err(|e| warn!(field, value, error = %e, "unparseable calendar date"))
        .ok()
}

/// Convert one calendar record.
///
/// Operating days are normalized to `YYYY-MM-DD`; unparseable ones are
/// dropped. Day types are kept verbatim.
pub fn extract_calendar(raw: &txc::ServiceCalendar) -> ServiceCalendar {
    let start = parse_optional_date(raw.start_date.as_deref(), "StartDate");
    let end = parse_optional_date(raw.end_date.as_deref(), "EndDate");

    let operating_days = raw
        .days_of_operation
        .as_ref()
        .map(|d| d.date.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(|d| parse_optional_date(Some(d.trim()), "DaysOfOperation"))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();

    let day_types = raw
        .day_types
        .as_ref()
        .map(|d| d.day_type.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    ServiceCalendar {
        id: ServiceCalendar::period_id(start, end),
        start_date: start.map(|d| d.format("%Y-%m-%d").to_string()),
        end_date: end.map(|d| d.format("%Y-%m-%d").to_string()),
        operating_days,
        day_types,
    }
}

/// Convert every calendar record.
///
/// Records sharing a period are all returned; the store write turns the
/// later ones into updates of the first.
pub fn extract_calendars(records: &[txc::ServiceCalendar]) -> Vec<ServiceCalendar> {
    let calendars: Vec<ServiceCalendar> = records.iter().map(extract_calendar).collect();
    debug!(count = calendars.len(), "extracted service calendars");
    calendars
}
