//! Route expansion into full stop sequences.

use tracing::{debug, warn};

use crate::domain::{JourneyPatternId, LineId, OrderedSet, Route, RouteId};
use crate::txc;

use super::journey_patterns::PatternTable;
use super::{dedup_by_id, parse_flag};

/// Expand a route record against the pattern table.
///
/// The route's stop sequence is the union of its referenced patterns' stop
/// sequences, each stop kept at its first-seen position. References to
/// unknown pattern sections contribute nothing.
pub fn expand_route(raw: &txc::Route, patterns: &PatternTable) -> Option<Route> {
    let Some(id) = raw.id.as_deref().and_then(|s| RouteId::new(s).ok()) else {
        warn!(description = ?raw.description, "skipping route without identifier");
        return None;
    };

    let section_refs: Vec<JourneyPatternId> = raw
        .section_refs()
        .iter()
        .filter_map(|r| JourneyPatternId::new(r.trim()).ok())
        .collect();

    let mut stops_sequence = OrderedSet::new();
    for section in &section_refs {
        match patterns.get(section) {
            Some(pattern) => stops_sequence.extend_from(&pattern.stop_sequence),
            None => warn!(route = %id, section = %section, "route references unknown journey pattern section"),
        }
    }

    let extensions = raw.extensions.as_ref();

    Some(Route {
        description: raw.description.clone(),
        line_ref: extensions
            .and_then(|e| e.line_ref.as_deref())
            .and_then(|s| LineId::new(s).ok()),
        direction: extensions.and_then(|e| e.direction.clone()),
        journey_pattern_section_refs: section_refs,
        stops_sequence,
        is_technical: parse_flag(extensions.and_then(|e| e.is_technical.as_deref()), false),
        is_visible_for_passengers: parse_flag(
            extensions.and_then(|e| e.is_visible_for_passengers.as_deref()),
            true,
        ),
        id,
    })
}

/// Expand every route, keeping the first record per identifier.
pub fn expand_routes(records: &[txc::Route], patterns: &PatternTable) -> Vec<Route> {
    let routes = dedup_by_id(
        records.iter().filter_map(|r| expand_route(r, patterns)),
        |r| &r.id,
        "routes",
    );
    debug!(count = routes.len(), "expanded routes");
    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;
    use crate::extract::build_journey_patterns;

    fn patterns() -> PatternTable {
        let sections: Vec<txc::JourneyPatternSection> = serde_json::from_str(
            r#"[
                {"id": "P1", "JourneyPatternTimingLink": [
                    {"From": {"StopPointRef": "A"}, "To": {"StopPointRef": "B"}},
                    {"From": {"StopPointRef": "B"}, "To": {"StopPointRef": "C"}}
                ]},
                {"id": "P2", "JourneyPatternTimingLink": [
                    {"From": {"StopPointRef": "B"}, "To": {"StopPointRef": "D"}},
                    {"From": {"StopPointRef": "D"}, "To": {"StopPointRef": "A"}}
                ]}
            ]"#,
        )
        .unwrap();
        build_journey_patterns(&sections)
    }

    fn route(json: &str) -> txc::Route {
        serde_json::from_str(json).unwrap()
    }

    fn stops(route: &Route) -> Vec<&str> {
        route.stops_sequence.iter().map(StopId::as_str).collect()
    }

    #[test]
    fn union_preserves_first_seen_order() {
        let raw = route(
            r#"{"id": "R1", "Description": "Centre - Airport",
                "JourneyPatternSectionRefs": {"JourneyPatternSectionRef": ["P1", "P2"]},
                "Extensions": {"LineRef": "L12", "Direction": "outbound"}}"#,
        );

        let route = expand_route(&raw, &patterns()).unwrap();

        assert_eq!(stops(&route), ["A", "B", "C", "D"]);
        assert_eq!(route.line_ref.as_ref().unwrap().as_str(), "L12");
        assert_eq!(route.direction.as_deref(), Some("outbound"));
        assert_eq!(route.journey_pattern_section_refs.len(), 2);
        assert!(!route.is_technical);
        assert!(route.is_visible_for_passengers);
    }

    #[test]
    fn reference_order_matters() {
        let raw = route(
            r#"{"id": "R2", "JourneyPatternSectionRefs": {"JourneyPatternSectionRef": ["P2", "P1"]}}"#,
        );

        let route = expand_route(&raw, &patterns()).unwrap();

        assert_eq!(stops(&route), ["B", "D", "A", "C"]);
        assert!(route.line_ref.is_none());
    }

    #[test]
    fn unknown_section_is_same_as_absent() {
        let with_unknown = route(
            r#"{"id": "R3", "JourneyPatternSectionRefs": {"JourneyPatternSectionRef": ["P1", "MISSING", "P2"]}}"#,
        );
        let without = route(
            r#"{"id": "R3", "JourneyPatternSectionRefs": {"JourneyPatternSectionRef": ["P1", "P2"]}}"#,
        );

        let table = patterns();
        let a = expand_route(&with_unknown, &table).unwrap();
        let b = expand_route(&without, &table).unwrap();

        assert_eq!(a.stops_sequence, b.stops_sequence);
        // The reference itself is kept on the route
        assert_eq!(a.journey_pattern_section_refs.len(), 3);
    }

    #[test]
    fn flags_and_missing_refs() {
        let raw = route(
            r#"{"id": "R4", "Extensions": {"IsTechnical": "true", "IsVisibleForPassengers": "false"}}"#,
        );

        let route = expand_route(&raw, &patterns()).unwrap();

        assert!(route.stops_sequence.is_empty());
        assert!(route.is_technical);
        assert!(!route.is_visible_for_passengers);
    }

    #[test]
    fn routes_without_id_are_skipped() {
        let records = vec![route(r#"{"Description": "nameless"}"#), route(r#"{"id": "R5"}"#)];
        let routes = expand_routes(&records, &patterns());
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].id.as_str(), "R5");
    }
}
