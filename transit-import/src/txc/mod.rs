//! Schedule document input.
//!
//! The document arrives as the JSON rendering of a TransXChange-style XML
//! file. This module owns everything that knows about that shape:
//! - `types`: one record struct per element, all fields optional
//! - `serde_helpers`: folding single/list/absent/blank children into `Vec`
//! - `load_document`: reading and unwrapping the root element

mod error;
mod serde_helpers;
mod types;

use std::path::Path;

use serde_json::Value;
use tracing::debug;

pub use error::LoadError;
pub use types::{
    AdministrativeArea, Descriptor, Frequency, JourneyPattern, JourneyPatternSection,
    JourneyPatternTimingLink, Line, Location, Route, Service, ServiceCalendar, StopArea,
    StopPoint, TimingLinkEnd, TransXChange, VehicleJourney, VehicleJourneyTimingLink,
};

/// Name of the root element when the parser keeps it.
const ROOT_ELEMENT: &str = "TransXChange";

/// Read and parse a schedule document from disk.
pub fn load_document(path: impl AsRef<Path>) -> Result<TransXChange, LoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = json.len(), "read schedule document");
    parse_document(&json)
}

/// Parse a schedule document from its JSON text.
///
/// Accepts both `{"TransXChange": {...}}` and the bare inner record.
pub fn parse_document(json: &str) -> Result<TransXChange, LoadError> {
    let value: Value = serde_json::from_str(json)?;

    let root = match value {
        Value::Object(mut map) => match map.remove(ROOT_ELEMENT) {
            Some(inner @ Value::Object(_)) => inner,
            Some(_) => Value::Object(Default::default()),
            None => Value::Object(map),
        },
        Value::Array(_) => return Err(LoadError::UnexpectedRoot("array")),
        Value::String(_) => return Err(LoadError::UnexpectedRoot("string")),
        Value::Number(_) => return Err(LoadError::UnexpectedRoot("number")),
        Value::Bool(_) => return Err(LoadError::UnexpectedRoot("boolean")),
        Value::Null => return Err(LoadError::UnexpectedRoot("null")),
    };

    Ok(serde_json::from_value(root)?)
}
