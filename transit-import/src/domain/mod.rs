//! Domain types for the schedule importer.
//!
//! This module contains the normalized entities the pipeline produces. Each
//! type serializes directly to the document stored in its collection, with
//! the identifier under `_id`.

mod calendar;
mod ids;
mod journey_pattern;
mod line;
mod ordered_set;
mod stop;
mod time;
mod vehicle_journey;

pub use calendar::ServiceCalendar;
pub use ids::{
    AdminAreaId, InvalidId, JourneyPatternId, LineId, RouteId, StopAreaId, StopId,
    VehicleJourneyId,
};
pub use journey_pattern::{DEFAULT_DIRECTION, JourneyPattern, Route, TimingEdge};
pub use line::{AdministrativeArea, Line, LineCategory, StopArea};
pub use ordered_set::OrderedSet;
pub use stop::{DirectionRecord, GeoPoint, Stop};
pub use time::{TimeError, parse_clock_time, parse_date, parse_iso_duration};
pub use vehicle_journey::{FrequencyWindow, JourneyKind, StopVisit, VehicleJourney};
