//! Journey patterns and routes.

use serde::Serialize;

use super::ids::{JourneyPatternId, LineId, RouteId, StopId};
use super::ordered_set::OrderedSet;

/// Direction label used when a timing link does not carry one.
pub const DEFAULT_DIRECTION: &str = "outbound";

/// A directed segment between two consecutive stops of a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingEdge {
    pub link_id: Option<String>,
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub direction: String,
    /// Nominal run time in seconds.
    pub run_time: i64,
    pub route_link_ref: Option<String>,
}

/// A reusable ordered template of stops.
///
/// `stop_sequence` holds each stop once, in the order it is first reached
/// along the timing links. Every edge in `timing_edges` has both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyPattern {
    #[serde(rename = "_id")]
    pub id: JourneyPatternId,
    pub stop_sequence: OrderedSet<StopId>,
    pub timing_edges: Vec<TimingEdge>,
}

/// A route: the union of the journey patterns it is composed from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(rename = "_id")]
    pub id: RouteId,
    pub description: Option<String>,
    pub line_ref: Option<LineId>,
    pub direction: Option<String>,
    pub journey_pattern_section_refs: Vec<JourneyPatternId>,
    /// First-seen-order union of the referenced patterns' stop sequences.
    pub stops_sequence: OrderedSet<StopId>,
    pub is_technical: bool,
    pub is_visible_for_passengers: bool,
}
