//! Extraction from raw records to domain entities.
//!
//! Each extractor maps one raw record to one entity without looking at any
//! other collection, except the route expander which reads the already
//! built journey pattern table. Missing or malformed fields degrade to
//! defaults and are logged; extraction itself never fails.

mod calendars;
mod entities;
mod journey_patterns;
mod routes;
mod vehicle_journeys;

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use tracing::warn;

use crate::domain::{StopId, parse_iso_duration};
use crate::txc::TimingLinkEnd;

pub use calendars::{extract_calendar, extract_calendars};
pub use entities::{
    extract_administrative_areas, extract_lines, extract_stop, extract_stop_areas,
    extract_stops,
};
pub use journey_patterns::{PatternTable, build_journey_pattern, build_journey_patterns};
pub use routes::{expand_route, expand_routes};
pub use vehicle_journeys::{expand_stop_visits, extract_vehicle_journey, extract_vehicle_journeys};

/// Parse a boolean flag as emitted by the parser ("true", "1", "yes").
///
/// Absent values yield `default`; any other text is false.
fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
    }
}

/// Parse a coordinate, falling back to 0 when absent or malformed.
fn parse_coordinate(value: Option<&str>, owner: &str) -> f64 {
    match value {
        None => 0.0,
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!(owner, value = v, "unparseable coordinate, using 0");
            0.0
        }),
    }
}

/// Parse a run time, falling back to zero seconds.
fn parse_run_time(value: Option<&str>, owner: &str) -> i64 {
    match value {
        None => 0,
        Some(v) => match parse_iso_duration(v) {
            Ok(d) => d.num_seconds(),
            Err(e) => {
                warn!(owner, value = v, error = %e, "unparseable run time, using 0");
                0
            }
        },
    }
}

/// The stop referenced by one side of a timing link, if any.
fn end_stop(end: Option<&TimingLinkEnd>) -> Option<StopId> {
    end?.stop_point_ref
        .as_deref()
        .and_then(|s| StopId::new(s).ok())
}

/// Keep the first entity for each identifier, logging the rest.
fn dedup_by_id<T, K>(
    items: impl IntoIterator<Item = T>,
    id: impl Fn(&T) -> &K,
    collection: &'static str,
) -> Vec<T>
where
    K: Clone + Eq + Hash + Display,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| {
            let key = id(item);
            if seen.insert(key.clone()) {
                true
            } else {
                warn!(collection, id = %key, "duplicate identifier, keeping first record");
                false
            }
        })
        .collect()
}
