//! Stop points and the direction facts derived for them.

use serde::Serialize;

use super::ids::{AdminAreaId, LineId, StopAreaId, StopId};
use super::ordered_set::OrderedSet;

/// A GeoJSON point, `coordinates` ordered `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    kind: &'static str,
    coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point",
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// For a given line, travel from this stop continues toward `next_stop`.
///
/// `sequence` is the stop's zero-based position in the journey pattern the
/// fact was derived from. Two records are the same fact only if all four
/// fields match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionRecord {
    pub line: LineId,
    pub direction: String,
    pub next_stop: StopId,
    pub sequence: usize,
}

/// A physical boarding point.
///
/// `lines` and `directions` are empty at extraction; the annotation merger
/// only ever adds to them in the store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    #[serde(rename = "_id")]
    pub id: StopId,
    pub name: Option<String>,
    pub street: Option<String>,
    pub locality_ref: Option<String>,
    pub public_code: Option<String>,
    pub bearing: Option<String>,
    pub location: GeoPoint,
    pub is_control_stop: bool,
    pub is_principal_stop: bool,
    pub stop_area: Option<StopAreaId>,
    pub administrative_area: Option<AdminAreaId>,
    pub lines: OrderedSet<LineId>,
    pub directions: OrderedSet<DirectionRecord>,
}

impl Stop {
    /// A stop with only an identifier and a location.
    pub fn new(id: StopId, location: GeoPoint) -> Self {
        Self {
            id,
            name: None,
            street: None,
            locality_ref: None,
            public_code: None,
            bearing: None,
            location,
            is_control_stop: false,
            is_principal_stop: false,
            stop_area: None,
            administrative_area: None,
            lines: OrderedSet::new(),
            directions: OrderedSet::new(),
        }
    }
}
