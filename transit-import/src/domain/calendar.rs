//! Service calendars.

use chrono::NaiveDate;
use serde::Serialize;

/// A period of operation, keyed by its date range.
///
/// The identifier is derived from the start/end pair so that importing the
/// same period again addresses the same document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCalendar {
    #[serde(rename = "_id")]
    pub id: String,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub operating_days: Vec<String>,
    pub day_types: Vec<String>,
}

impl ServiceCalendar {
    /// Identifier for the period `start..=end`; missing ends render as `open`.
    pub fn period_id(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
        let render = |d: Option<NaiveDate>| {
            d.map_or_else(|| "open".to_string(), |d| d.format("%Y-%m-%d").to_string())
        };
        format!("calendar_{}_{}", render(start), render(end))
    }
}
