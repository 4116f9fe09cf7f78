//! Lines and stop groupings.

use serde::Serialize;

use super::ids::{AdminAreaId, LineId, StopAreaId};
use super::stop::GeoPoint;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineCategory {
    pub category: Option<String>,
    pub transport_mode: Option<String>,
}

/// A public line. Immutable after extraction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    #[serde(rename = "_id")]
    pub id: LineId,
    /// Number shown to passengers, e.g. "12".
    pub number: Option<String>,
    pub marketing_name: Option<String>,
    pub category: LineCategory,
    pub color: Option<String>,
}

/// A group of physically co-located stops.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopArea {
    #[serde(rename = "_id")]
    pub id: StopAreaId,
    pub name: Option<String>,
    pub area_type: Option<String>,
    pub administrative_area: Option<AdminAreaId>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdministrativeArea {
    #[serde(rename = "_id")]
    pub id: AdminAreaId,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub atco_area_code: Option<String>,
}
