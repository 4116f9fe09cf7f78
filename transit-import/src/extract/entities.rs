//! Stop, line, stop-area and administrative-area extractors.

use tracing::{debug, warn};

use crate::domain::{
    AdminAreaId, AdministrativeArea, GeoPoint, Line, LineCategory, LineId, OrderedSet, Stop,
    StopArea, StopAreaId, StopId,
};
use crate::txc;

use super::{dedup_by_id, parse_coordinate, parse_flag};

/// Convert one stop point record.
///
/// Returns `None` if the record has neither an `id` nor an ATCO code.
pub fn extract_stop(sp: &txc::StopPoint) -> Option<Stop> {
    let Some(id) = sp
        .id
        .as_deref()
        .or(sp.atco_code.as_deref())
        .and_then(|s| StopId::new(s).ok())
    else {
        warn!("skipping stop point without identifier");
        return None;
    };

    let location = sp.place.as_ref().and_then(|p| p.location.as_ref());
    let location = GeoPoint::new(
        parse_coordinate(location.and_then(|l| l.longitude.as_deref()), id.as_str()),
        parse_coordinate(location.and_then(|l| l.latitude.as_deref()), id.as_str()),
    );

    let bearing = sp
        .stop_classification
        .as_ref()
        .and_then(|c| c.on_street.as_ref())
        .and_then(|s| s.bus.as_ref())
        .and_then(|b| b.marked_point.as_ref())
        .and_then(|m| m.bearing.as_ref())
        .and_then(|b| b.compass_point.clone());

    let stop_area = sp
        .stop_areas
        .as_ref()
        .and_then(|a| a.stop_area_ref.iter().find_map(|r| StopAreaId::new(r.trim()).ok()));

    let extensions = sp.extensions.as_ref();

    Some(Stop {
        name: sp.descriptor.as_ref().and_then(|d| d.common_name.clone()),
        street: sp.descriptor.as_ref().and_then(|d| d.street.clone()),
        locality_ref: sp.place.as_ref().and_then(|p| p.nptg_locality_ref.clone()),
        public_code: extensions.and_then(|e| e.public_code.clone()),
        bearing,
        location,
        is_control_stop: parse_flag(extensions.and_then(|e| e.control_stop.as_deref()), false),
        is_principal_stop: parse_flag(
            extensions.and_then(|e| e.principal_stop.as_deref()),
            false,
        ),
        stop_area,
        administrative_area: sp
            .administrative_area_ref
            .as_deref()
            .and_then(|s| AdminAreaId::new(s).ok()),
        lines: OrderedSet::new(),
        directions: OrderedSet::new(),
        id,
    })
}

/// Convert all stop points, keeping the first record per identifier.
pub fn extract_stops(records: &[txc::StopPoint]) -> Vec<Stop> {
    let stops = dedup_by_id(records.iter().filter_map(extract_stop), |s| &s.id, "stops");
    debug!(count = stops.len(), "extracted stops");
    stops
}

fn extract_line(raw: &txc::Line) -> Option<Line> {
    let Some(id) = raw.id.as_deref().and_then(|s| LineId::new(s).ok()) else {
        warn!(number = ?raw.line_name, "skipping line without identifier");
        return None;
    };

    let extensions = raw.extensions.as_ref();

    Some(Line {
        id,
        number: raw.line_name.clone(),
        marketing_name: raw.marketing_name.clone(),
        category: LineCategory {
            category: extensions.and_then(|e| e.line_category.clone()),
            transport_mode: extensions.and_then(|e| e.transport_mode.clone()),
        },
        color: raw.line_colour.clone(),
    })
}

pub fn extract_lines(records: &[txc::Line]) -> Vec<Line> {
    let lines = dedup_by_id(records.iter().filter_map(extract_line), |l| &l.id, "lines");
    debug!(count = lines.len(), "extracted lines");
    lines
}

fn extract_stop_area(raw: &txc::StopArea) -> Option<StopArea> {
    let Some(id) = raw
        .id
        .as_deref()
        .or(raw.stop_area_code.as_deref())
        .and_then(|s| StopAreaId::new(s).ok())
    else {
        warn!(name = ?raw.name, "skipping stop area without identifier");
        return None;
    };

    let location = raw.location.as_ref().map(|l| {
        GeoPoint::new(
            parse_coordinate(l.longitude.as_deref(), id.as_str()),
            parse_coordinate(l.latitude.as_deref(), id.as_str()),
        )
    });

    Some(StopArea {
        name: raw.name.clone(),
        area_type: raw.stop_area_type.clone(),
        administrative_area: raw
            .administrative_area_ref
            .as_deref()
            .and_then(|s| AdminAreaId::new(s).ok()),
        location,
        id,
    })
}

pub fn extract_stop_areas(records: &[txc::StopArea]) -> Vec<StopArea> {
    let areas = dedup_by_id(
        records.iter().filter_map(extract_stop_area),
        |a| &a.id,
        "stop_areas",
    );
    debug!(count = areas.len(), "extracted stop areas");
    areas
}

fn extract_administrative_area(raw: &txc::AdministrativeArea) -> Option<AdministrativeArea> {
    let Some(id) = raw
        .id
        .as_deref()
        .or(raw.administrative_area_code.as_deref())
        .and_then(|s| AdminAreaId::new(s).ok())
    else {
        warn!(name = ?raw.name, "skipping administrative area without identifier");
        return None;
    };

    Some(AdministrativeArea {
        id,
        name: raw.name.clone(),
        short_name: raw.short_name.clone(),
        atco_area_code: raw.atco_area_code.clone(),
    })
}

pub fn extract_administrative_areas(records: &[txc::AdministrativeArea]) -> Vec<AdministrativeArea> {
    let areas = dedup_by_id(
        records.iter().filter_map(extract_administrative_area),
        |a| &a.id,
        "administrative_areas",
    );
    debug!(count = areas.len(), "extracted administrative areas");
    areas
}
