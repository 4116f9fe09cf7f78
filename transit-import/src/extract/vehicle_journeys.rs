//! Vehicle-journey expansion.

use tracing::{debug, warn};

use crate::domain::{
    FrequencyWindow, JourneyKind, LineId, StopId, StopVisit, VehicleJourney, VehicleJourneyId,
    parse_clock_time, parse_iso_duration,
};
use crate::txc::{self, TimingLinkEnd, VehicleJourneyTimingLink};

use super::dedup_by_id;

/// Expand a trip's timing links into its ordered stop visits.
///
/// Link `i` contributes its `From` side at sequence `i + 1`. The final
/// link's `To` side, when it names a stop, closes the list at sequence
/// `links.len() + 1`. Entries without a stop reference are dropped, so
/// sequence numbers may have gaps.
pub fn expand_stop_visits(links: &[VehicleJourneyTimingLink]) -> Vec<StopVisit> {
    let mut ends: Vec<(usize, Option<&TimingLinkEnd>)> = links
        .iter()
        .enumerate()
        .map(|(i, link)| (i + 1, link.from.as_ref()))
        .collect();

    if let Some(last) = links.last()
        && let Some(to) = last.to.as_ref()
        && to.stop_point_ref.is_some()
    {
        ends.push((links.len() + 1, Some(to)));
    }

    ends.into_iter()
        .filter_map(|(sequence, end)| {
            let end = end?;
            let stop_ref = end.stop_point_ref.as_deref().and_then(|s| StopId::new(s).ok())?;
            Some(StopVisit {
                sequence,
                stop_ref,
                timing_status: end.timing_status.clone(),
                activity: end.activity.clone(),
                dynamic_display: end.dynamic_destination_display.clone(),
            })
        })
        .collect()
}

fn format_clock_time(value: Option<&str>, owner: &str, field: &'static str) -> Option<String> {
    let value = value?;
    match parse_clock_time(value) {
        Ok(t) => Some(t.format("%H:%M:%S").to_string()),
        Err(e) => {
            warn!(journey = owner, field, value, error = %e, "unparseable time");
            None
        }
    }
}

/// Convert one trip record; `ordinal` is its position in the document.
///
/// Records without a journey code get `{line}_{departure}_{ordinal}`.
/// Returns `None` when the trip visits no stops.
pub fn extract_vehicle_journey(raw: &txc::VehicleJourney, ordinal: usize) -> Option<VehicleJourney> {
    let departure_time = format_clock_time(
        raw.departure_time.as_deref(),
        raw.vehicle_journey_code.as_deref().unwrap_or("?"),
        "DepartureTime",
    );

    let code = raw.vehicle_journey_code.clone().unwrap_or_else(|| {
        format!(
            "{}_{}_{}",
            raw.line_ref.as_deref().unwrap_or("unknown"),
            departure_time.as_deref().unwrap_or("unknown"),
            ordinal
        )
    });
    let id = VehicleJourneyId::new(code).ok()?;

    let links = &raw.vehicle_journey_timing_link;
    let stop_points = expand_stop_visits(links);
    if stop_points.is_empty() {
        warn!(journey = %id, line = ?raw.line_ref, "skipping vehicle journey with no stops");
        return None;
    }

    let destination_display = links
        .last()
        .and_then(|l| l.to.as_ref())
        .and_then(|to| to.dynamic_destination_display.clone());

    let frequency = raw.frequency.as_ref().map(|f| FrequencyWindow {
        end_time: format_clock_time(f.end_time.as_deref(), id.as_str(), "EndTime"),
        interval: f
            .interval
            .as_ref()
            .and_then(|i| i.scheduled_frequency.as_deref())
            .and_then(|s| match parse_iso_duration(s) {
                Ok(d) => Some(d.num_seconds()),
                Err(e) => {
                    warn!(journey = %id, value = s, error = %e, "unparseable frequency interval");
                    None
                }
            }),
    });

    let kind = match &frequency {
        Some(FrequencyWindow {
            interval: Some(_), ..
        }) => JourneyKind::Frequency,
        _ => JourneyKind::Scheduled,
    };

    Some(VehicleJourney {
        line_ref: raw.line_ref.as_deref().and_then(|s| LineId::new(s).ok()),
        service_ref: raw.service_ref.clone(),
        journey_pattern_ref: raw.journey_pattern_ref.clone(),
        departure_time,
        destination_display,
        stop_points,
        kind,
        frequency,
        id,
    })
}

pub fn extract_vehicle_journeys(records: &[txc::VehicleJourney]) -> Vec<VehicleJourney> {
    let journeys = dedup_by_id(
        records
            .iter()
            .enumerate()
            .filter_map(|(i, vj)| extract_vehicle_journey(vj, i + 1)),
        |vj| &vj.id,
        "vehicle_journeys",
    );
    debug!(count = journeys.len(), "extracted vehicle journeys");
    journeys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn journey(json: &str) -> txc::VehicleJourney {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn three_links_give_four_visits() {
        let vj = journey(
            r#"{"VehicleJourneyCode": "VJ1", "VehicleJourneyTimingLink": [
                {"From": {"StopPointRef": "A", "TimingStatus": "PTP", "Activity": "pickUp"}, "To": {"StopPointRef": "B"}},
                {"From": {"StopPointRef": "B"}, "To": {"StopPointRef": "C"}},
                {"From": {"StopPointRef": "C"}, "To": {"StopPointRef": "D", "TimingStatus": "TIP", "Activity": "setDown", "DynamicDestinationDisplay": "Airport"}}
            ]}"#,
        );

        let visits = expand_stop_visits(&vj.vehicle_journey_timing_link);

        assert_eq!(visits.len(), 4);
        let sequences: Vec<usize> = visits.iter().map(|v| v.sequence).collect();
        assert_eq!(sequences, [1, 2, 3, 4]);
        assert_eq!(visits[0].activity.as_deref(), Some("pickUp"));

        let last = &visits[3];
        assert_eq!(last.stop_ref.as_str(), "D");
        assert_eq!(last.timing_status.as_deref(), Some("TIP"));
        assert_eq!(last.activity.as_deref(), Some("setDown"));
        assert_eq!(last.dynamic_display.as_deref(), Some("Airport"));
    }

    #[test]
    fn final_to_without_stop_is_not_appended() {
        let vj = journey(
            r#"{"VehicleJourneyTimingLink": [
                {"From": {"StopPointRef": "A"}, "To": {"StopPointRef": "B"}},
                {"From": {"StopPointRef": "B"}, "To": {"Activity": "setDown"}}
            ]}"#,
        );

        let visits = expand_stop_visits(&vj.vehicle_journey_timing_link);

        assert_eq!(visits.len(), 2);
        assert_eq!(visits[1].stop_ref.as_str(), "B");
    }

    #[test]
    fn from_without_stop_is_filtered_keeping_sequence() {
        let vj = journey(
            r#"{"VehicleJourneyTimingLink": [
                {"From": {"StopPointRef": "A"}, "To": {"StopPointRef": "B"}},
                {"From": {}, "To": {"StopPointRef": "C"}}
            ]}"#,
        );

        let visits = expand_stop_visits(&vj.vehicle_journey_timing_link);

        let seq: Vec<(usize, &str)> = visits.iter().map(|v| (v.sequence, v.stop_ref.as_str())).collect();
        assert_eq!(seq, [(1, "A"), (3, "C")]);
    }

    #[test]
    fn no_links_no_visits() {
        assert!(expand_stop_visits(&[]).is_empty());
    }

    #[test]
    fn full_journey() {
        let vj = journey(
            r#"{"VehicleJourneyCode": "VJ7", "LineRef": "L12", "ServiceRef": "SV1",
                "JourneyPatternRef": "JP1", "DepartureTime": "06:15:00",
                "VehicleJourneyTimingLink": {"From": {"StopPointRef": "A"}, "To": {"StopPointRef": "B", "DynamicDestinationDisplay": "Zoo"}},
                "Frequency": {"EndTime": "09:00", "Interval": {"ScheduledFrequency": "PT10M"}}}"#,
        );

        let vj = extract_vehicle_journey(&vj, 1).unwrap();

        assert_eq!(vj.id.as_str(), "VJ7");
        assert_eq!(vj.line_ref.unwrap().as_str(), "L12");
        assert_eq!(vj.departure_time.as_deref(), Some("06:15:00"));
        assert_eq!(vj.destination_display.as_deref(), Some("Zoo"));
        assert_eq!(vj.stop_points.len(), 2);
        assert_eq!(vj.kind, JourneyKind::Frequency);
        let freq = vj.frequency.unwrap();
        assert_eq!(freq.end_time.as_deref(), Some("09:00:00"));
        assert_eq!(freq.interval, Some(600));
    }

    #[test]
    fn generated_identifier() {
        let raw = journey(
            r#"{"LineRef": "L3", "DepartureTime": "07:05",
                "VehicleJourneyTimingLink": {"From": {"StopPointRef": "A"}, "To": {"StopPointRef": "B"}}}"#,
        );

        let vj = extract_vehicle_journey(&raw, 4).unwrap();

        assert_eq!(vj.id.as_str(), "L3_07:05:00_4");
        assert_eq!(vj.kind, JourneyKind::Scheduled);
        assert!(vj.frequency.is_none());
    }

    #[test]
    fn journey_without_stops_is_skipped() {
        let raw = journey(r#"{"VehicleJourneyCode": "EMPTY", "LineRef": "L1"}"#);
        assert!(extract_vehicle_journey(&raw, 1).is_none());
    }
}
