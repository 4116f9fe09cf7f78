//! Scheduled trips.

use serde::Serialize;

use super::ids::{LineId, StopId, VehicleJourneyId};

/// One stop visited by a trip, `sequence` counting from 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopVisit {
    pub sequence: usize,
    pub stop_ref: StopId,
    pub timing_status: Option<String>,
    pub activity: Option<String>,
    pub dynamic_display: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneyKind {
    /// Runs once at its departure time.
    Scheduled,
    /// Repeats at a fixed interval until its end time.
    Frequency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyWindow {
    pub end_time: Option<String>,
    /// Seconds between departures.
    pub interval: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleJourney {
    #[serde(rename = "_id")]
    pub id: VehicleJourneyId,
    pub line_ref: Option<LineId>,
    pub service_ref: Option<String>,
    pub journey_pattern_ref: Option<String>,
    /// `HH:MM:SS`
    pub departure_time: Option<String>,
    /// Headsign shown on arrival at the final stop.
    pub destination_display: Option<String>,
    pub stop_points: Vec<StopVisit>,
    pub kind: JourneyKind,
    pub frequency: Option<FrequencyWindow>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(JourneyKind::Frequency).unwrap(),
            json!("frequency")
        );
        assert_eq!(
            serde_json::to_value(JourneyKind::Scheduled).unwrap(),
            json!("scheduled")
        );
    }

    #[test]
    fn stop_visit_shape() {
        let visit = StopVisit {
            sequence: 1,
            stop_ref: StopId::new("A").unwrap(),
            timing_status: Some("PTP".into()),
            activity: None,
            dynamic_display: None,
        };
        assert_eq!(
            serde_json::to_value(&visit).unwrap(),
            json!({
                "sequence": 1,
                "stopRef": "A",
                "timingStatus": "PTP",
                "activity": null,
                "dynamicDisplay": null
            })
        );
    }
}
