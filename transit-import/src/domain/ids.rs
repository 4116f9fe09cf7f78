//! Entity identifier types.
//!
//! Every collection is keyed by an opaque source identifier. Wrapping each
//! kind in its own type keeps a route id from ever being looked up in the
//! line table. The only validation is that identifiers must be non-empty.

use std::fmt;

use serde::Serialize;

/// Error returned when constructing an identifier from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} identifier: must not be empty")]
pub struct InvalidId {
    kind: &'static str,
}

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier, rejecting empty strings.
            pub fn new(s: impl Into<String>) -> Result<Self, InvalidId> {
                let s = s.into();
                if s.is_empty() {
                    return Err(InvalidId { kind: $kind });
                }
                Ok(Self(s))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier of a stop point.
    StopId,
    "stop"
);
entity_id!(
    /// Identifier of a line.
    LineId,
    "line"
);
entity_id!(
    /// Identifier of a route.
    RouteId,
    "route"
);
entity_id!(
    /// Identifier of a journey pattern (a journey pattern section in the source).
    JourneyPatternId,
    "journey pattern"
);
entity_id!(
    /// Identifier of a scheduled trip.
    VehicleJourneyId,
    "vehicle journey"
);
entity_id!(StopAreaId, "stop area");
entity_id!(AdminAreaId, "administrative area");
