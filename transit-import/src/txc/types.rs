//! Raw schedule document records.
//!
//! These types map directly to the records emitted by the XML parser: one
//! struct per element, attributes merged in as plain fields. Every scalar is
//! an optional string because the parser neither types values nor
//! guarantees their presence; parsing happens during extraction.

use serde::Deserialize;

use super::serde_helpers::{lenient, one_or_many, scalar_string};

/// Root element of a schedule document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransXChange {
    #[serde(default, deserialize_with = "lenient")]
    pub stop_points: Option<StopPoints>,

    #[serde(default, deserialize_with = "lenient")]
    pub stop_areas: Option<StopAreas>,

    #[serde(default, deserialize_with = "lenient")]
    pub administrative_areas: Option<AdministrativeAreas>,

    #[serde(default, deserialize_with = "lenient")]
    pub lines: Option<Lines>,

    #[serde(default, deserialize_with = "lenient")]
    pub journey_pattern_sections: Option<JourneyPatternSections>,

    #[serde(default, deserialize_with = "lenient")]
    pub routes: Option<Routes>,

    #[serde(default, deserialize_with = "lenient")]
    pub services: Option<Services>,

    #[serde(default, deserialize_with = "lenient")]
    pub vehicle_journeys: Option<VehicleJourneys>,

    #[serde(default, deserialize_with = "lenient")]
    pub service_calendars: Option<ServiceCalendars>,
}

impl TransXChange {
    pub fn stop_points(&self) -> &[StopPoint] {
        self.stop_points.as_ref().map_or(&[], |c| &c.stop_point)
    }

    pub fn stop_areas(&self) -> &[StopArea] {
        self.stop_areas.as_ref().map_or(&[], |c| &c.stop_area)
    }

    pub fn administrative_areas(&self) -> &[AdministrativeArea] {
        self.administrative_areas
            .as_ref()
            .map_or(&[], |c| &c.administrative_area)
    }

    pub fn lines(&self) -> &[Line] {
        self.lines.as_ref().map_or(&[], |c| &c.line)
    }

    pub fn journey_pattern_sections(&self) -> &[JourneyPatternSection] {
        self.journey_pattern_sections
            .as_ref()
            .map_or(&[], |c| &c.journey_pattern_section)
    }

    pub fn routes(&self) -> &[Route] {
        self.routes.as_ref().map_or(&[], |c| &c.route)
    }

    pub fn services(&self) -> &[Service] {
        self.services.as_ref().map_or(&[], |c| &c.service)
    }

    pub fn vehicle_journeys(&self) -> &[VehicleJourney] {
        self.vehicle_journeys
            .as_ref()
            .map_or(&[], |c| &c.vehicle_journey)
    }

    pub fn service_calendars(&self) -> &[ServiceCalendar] {
        self.service_calendars
            .as_ref()
            .map_or(&[], |c| &c.service_calendar)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopPoints {
    #[serde(default, deserialize_with = "one_or_many")]
    pub stop_point: Vec<StopPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopAreas {
    #[serde(default, deserialize_with = "one_or_many")]
    pub stop_area: Vec<StopArea>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdministrativeAreas {
    #[serde(default, deserialize_with = "one_or_many")]
    pub administrative_area: Vec<AdministrativeArea>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Lines {
    #[serde(default, deserialize_with = "one_or_many")]
    pub line: Vec<Line>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JourneyPatternSections {
    #[serde(default, deserialize_with = "one_or_many")]
    pub journey_pattern_section: Vec<JourneyPatternSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Routes {
    #[serde(default, deserialize_with = "one_or_many")]
    pub route: Vec<Route>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Services {
    #[serde(default, deserialize_with = "one_or_many")]
    pub service: Vec<Service>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleJourneys {
    #[serde(default, deserialize_with = "one_or_many")]
    pub vehicle_journey: Vec<VehicleJourney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceCalendars {
    #[serde(default, deserialize_with = "one_or_many")]
    pub service_calendar: Vec<ServiceCalendar>,
}

/// A physical boarding point.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopPoint {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    /// National stop code; used when the record carries no `id` attribute.
    #[serde(default, deserialize_with = "scalar_string")]
    pub atco_code: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub descriptor: Option<Descriptor>,

    #[serde(default, deserialize_with = "lenient")]
    pub place: Option<Place>,

    #[serde(default, deserialize_with = "lenient")]
    pub stop_classification: Option<StopClassification>,

    #[serde(default, deserialize_with = "lenient")]
    pub stop_areas: Option<StopAreaRefs>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub administrative_area_ref: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub extensions: Option<StopPointExtensions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Descriptor {
    #[serde(default, deserialize_with = "scalar_string")]
    pub common_name: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub street: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub indicator: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Place {
    #[serde(default, deserialize_with = "scalar_string")]
    pub nptg_locality_ref: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Location {
    #[serde(default, deserialize_with = "scalar_string")]
    pub longitude: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub latitude: Option<String>,
}

/// Only the on-street bus bearing is read; other classifications are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopClassification {
    #[serde(default, deserialize_with = "lenient")]
    pub on_street: Option<OnStreet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OnStreet {
    #[serde(default, deserialize_with = "lenient")]
    pub bus: Option<BusStop>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusStop {
    #[serde(default, deserialize_with = "lenient")]
    pub marked_point: Option<MarkedPoint>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarkedPoint {
    #[serde(default, deserialize_with = "lenient")]
    pub bearing: Option<Bearing>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bearing {
    #[serde(default, deserialize_with = "scalar_string")]
    pub compass_point: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopAreaRefs {
    #[serde(default, deserialize_with = "one_or_many")]
    pub stop_area_ref: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopPointExtensions {
    #[serde(default, deserialize_with = "scalar_string")]
    pub public_code: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub control_stop: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub principal_stop: Option<String>,
}

/// A grouping of co-located stop points.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StopArea {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub stop_area_code: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub stop_area_type: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub administrative_area_ref: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AdministrativeArea {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub administrative_area_code: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub short_name: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub atco_area_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Line {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    /// Public line number, e.g. "12" or "N5".
    #[serde(default, deserialize_with = "scalar_string")]
    pub line_name: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub marketing_name: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub line_colour: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub extensions: Option<LineExtensions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineExtensions {
    #[serde(default, deserialize_with = "scalar_string")]
    pub line_category: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub transport_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JourneyPatternSection {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub journey_pattern_timing_link: Vec<JourneyPatternTimingLink>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JourneyPatternTimingLink {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<TimingLinkEnd>,

    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<TimingLinkEnd>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub route_link_ref: Option<String>,

    /// ISO 8601 duration, e.g. `PT2M`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub run_time: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub direction: Option<String>,
}

/// One side of a timing link, shared by pattern and vehicle-journey links.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimingLinkEnd {
    #[serde(default, deserialize_with = "scalar_string")]
    pub stop_point_ref: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub timing_status: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub activity: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub dynamic_destination_display: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub sequence_number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Route {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub journey_pattern_section_refs: Option<JourneyPatternSectionRefs>,

    #[serde(default, deserialize_with = "lenient")]
    pub extensions: Option<RouteExtensions>,
}

impl Route {
    pub fn section_refs(&self) -> &[String] {
        self.journey_pattern_section_refs
            .as_ref()
            .map_or(&[], |r| &r.journey_pattern_section_ref)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JourneyPatternSectionRefs {
    #[serde(default, deserialize_with = "one_or_many")]
    pub journey_pattern_section_ref: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RouteExtensions {
    #[serde(default, deserialize_with = "scalar_string")]
    pub line_ref: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub direction: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub is_technical: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub is_visible_for_passengers: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Service {
    #[serde(default, deserialize_with = "scalar_string")]
    pub service_code: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub standard_service: Option<StandardService>,
}

impl Service {
    pub fn journey_patterns(&self) -> &[JourneyPattern] {
        self.standard_service
            .as_ref()
            .map_or(&[], |s| &s.journey_pattern)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StandardService {
    #[serde(default, deserialize_with = "one_or_many")]
    pub journey_pattern: Vec<JourneyPattern>,
}

/// A journey pattern as declared by a service.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct JourneyPattern {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub route_ref: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub direction: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub journey_pattern_section_refs: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleJourney {
    #[serde(default, deserialize_with = "scalar_string")]
    pub vehicle_journey_code: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub line_ref: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub service_ref: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub journey_pattern_ref: Option<String>,

    /// Departure time, `HH:MM:SS`.
    #[serde(default, deserialize_with = "scalar_string")]
    pub departure_time: Option<String>,

    #[serde(default, deserialize_with = "one_or_many")]
    pub vehicle_journey_timing_link: Vec<VehicleJourneyTimingLink>,

    #[serde(default, deserialize_with = "lenient")]
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VehicleJourneyTimingLink {
    #[serde(rename = "id", default, deserialize_with = "scalar_string")]
    pub id: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<TimingLinkEnd>,

    #[serde(default, deserialize_with = "lenient")]
    pub to: Option<TimingLinkEnd>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub run_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Frequency {
    #[serde(default, deserialize_with = "scalar_string")]
    pub end_time: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub interval: Option<FrequencyInterval>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FrequencyInterval {
    /// ISO 8601 duration between departures.
    #[serde(default, deserialize_with = "scalar_string")]
    pub scheduled_frequency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceCalendar {
    #[serde(default, deserialize_with = "scalar_string")]
    pub start_date: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub end_date: Option<String>,

    #[serde(default, deserialize_with = "lenient")]
    pub days_of_operation: Option<DaysOfOperation>,

    #[serde(default, deserialize_with = "lenient")]
    pub day_types: Option<DayTypes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DaysOfOperation {
    #[serde(default, deserialize_with = "one_or_many")]
    pub date: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DayTypes {
    #[serde(default, deserialize_with = "one_or_many")]
    pub day_type: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_stop_point() {
        let json = r#"{
            "id": "S1",
            "Descriptor": {"CommonName": "Rynek", "Street": "Glowna"},
            "Place": {
                "NptgLocalityRef": "L1",
                "Location": {"Longitude": "19.94", "Latitude": "50.06"}
            },
            "StopClassification": {
                "OnStreet": {"Bus": {"MarkedPoint": {"Bearing": {"CompassPoint": "N"}}}}
            },
            "StopAreas": {"StopAreaRef": "SA1"},
            "AdministrativeAreaRef": "A1",
            "Extensions": {"PublicCode": "01", "ControlStop": "true"}
        }"#;

        let sp: StopPoint = serde_json::from_str(json).unwrap();

        assert_eq!(sp.id.as_deref(), Some("S1"));
        let descriptor = sp.descriptor.unwrap();
        assert_eq!(descriptor.common_name.as_deref(), Some("Rynek"));
        assert_eq!(descriptor.street.as_deref(), Some("Glowna"));
        let location = sp.place.unwrap().location.unwrap();
        assert_eq!(location.longitude.as_deref(), Some("19.94"));
        assert_eq!(sp.stop_areas.unwrap().stop_area_ref, vec!["SA1".to_string()]);
        let bearing = sp
            .stop_classification
            .and_then(|c| c.on_street)
            .and_then(|s| s.bus)
            .and_then(|b| b.marked_point)
            .and_then(|m| m.bearing)
            .and_then(|b| b.compass_point);
        assert_eq!(bearing.as_deref(), Some("N"));
        let ext = sp.extensions.unwrap();
        assert_eq!(ext.control_stop.as_deref(), Some("true"));
        assert!(ext.principal_stop.is_none());
    }

    #[test]
    fn deserialize_document_with_single_children() {
        let json = r#"{
            "StopPoints": {"StopPoint": {"id": "S1"}},
            "Lines": {"Line": [{"id": "L1", "LineName": "12"}, {"id": "L2", "LineName": 5}]},
            "StopAreas": "",
            "Routes": {"Route": {"id": "R1", "JourneyPatternSectionRefs": {"JourneyPatternSectionRef": "JPS1"}}}
        }"#;

        let doc: TransXChange = serde_json::from_str(json).unwrap();

        assert_eq!(doc.stop_points().len(), 1);
        assert_eq!(doc.lines().len(), 2);
        assert_eq!(doc.lines()[1].line_name.as_deref(), Some("5"));
        assert!(doc.stop_areas().is_empty());
        assert!(doc.vehicle_journeys().is_empty());
        assert_eq!(doc.routes()[0].section_refs(), ["JPS1".to_string()]);
    }

    #[test]
    fn deserialize_vehicle_journey() {
        let json = r#"{
            "VehicleJourneyCode": "VJ1",
            "LineRef": "L1",
            "JourneyPatternRef": "JP1",
            "DepartureTime": "06:15:00",
            "VehicleJourneyTimingLink": [
                {"From": {"StopPointRef": "A", "Activity": "pickUp"}, "To": {"StopPointRef": "B"}},
                {"From": {"StopPointRef": "B"}, "To": {"StopPointRef": "C", "DynamicDestinationDisplay": "Centrum"}}
            ],
            "Frequency": {"EndTime": "09:00:00", "Interval": {"ScheduledFrequency": "PT10M"}}
        }"#;

        let vj: VehicleJourney = serde_json::from_str(json).unwrap();

        assert_eq!(vj.vehicle_journey_timing_link.len(), 2);
        let last_to = vj.vehicle_journey_timing_link[1].to.as_ref().unwrap();
        assert_eq!(last_to.dynamic_destination_display.as_deref(), Some("Centrum"));
        let freq = vj.frequency.unwrap();
        assert_eq!(
            freq.interval.unwrap().scheduled_frequency.as_deref(),
            Some("PT10M")
        );
    }

    #[test]
    fn deserialize_service_journey_patterns() {
        let json = r#"{
            "ServiceCode": "SV1",
            "StandardService": {
                "JourneyPattern": {"id": "JP1", "RouteRef": "R2", "JourneyPatternSectionRefs": ["JPS1", "JPS2"]}
            }
        }"#;

        let service: Service = serde_json::from_str(json).unwrap();

        let patterns = service.journey_patterns();
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].route_ref.as_deref(), Some("R2"));
        assert_eq!(patterns[0].journey_pattern_section_refs.len(), 2);
    }
}
