//! Journey pattern → route → line resolution.
//!
//! Patterns carry no line of their own. A pattern's owning route is claimed
//! by two independent sources, and the route's line comes from the route's
//! extension data. Composing the two gives each pattern its line.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::domain::{JourneyPatternId, LineId, Route, RouteId};
use crate::extract::PatternTable;
use crate::txc;

/// Where a pattern → route claim came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OwnershipSource {
    /// A route listing the pattern among its section references.
    RouteListing,
    /// A service declaring a journey pattern with an explicit route.
    ServiceDeclaration,
}

impl OwnershipSource {
    /// Sources in application order. A later source overwrites an earlier
    /// one's claim on the same pattern.
    pub const PRECEDENCE: [OwnershipSource; 2] = [
        OwnershipSource::RouteListing,
        OwnershipSource::ServiceDeclaration,
    ];
}

/// A pattern → route claim made by a service's journey pattern declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceClaim {
    pub pattern: JourneyPatternId,
    pub route: RouteId,
}

/// Collect the service-declared claims, in document order.
///
/// A declared journey pattern claims each section it references; one that
/// references no sections claims its own identifier. Declarations without a
/// route reference make no claim.
pub fn service_claims(services: &[txc::Service]) -> Vec<ServiceClaim> {
    let mut claims = Vec::new();
    for service in services {
        for jp in service.journey_patterns() {
            let Some(route) = jp.route_ref.as_deref().and_then(|r| RouteId::new(r).ok()) else {
                continue;
            };

            let sections: Vec<JourneyPatternId> = jp
                .journey_pattern_section_refs
                .iter()
                .filter_map(|s| JourneyPatternId::new(s.trim()).ok())
                .collect();

            if sections.is_empty() {
                if let Some(own) = jp.id.as_deref().and_then(|s| JourneyPatternId::new(s).ok()) {
                    claims.push(ServiceClaim {
                        pattern: own,
                        route,
                    });
                }
                continue;
            }

            claims.extend(sections.into_iter().map(|pattern| ServiceClaim {
                pattern,
                route: route.clone(),
            }));
        }
    }
    claims
}

/// Pattern → owning route, merged from both sources.
#[derive(Debug, Clone, Default)]
pub struct PatternOwnership {
    owners: HashMap<JourneyPatternId, (RouteId, OwnershipSource)>,
}

impl PatternOwnership {
    /// Merge both sources, applying them in [`OwnershipSource::PRECEDENCE`]
    /// order. Within a source, a later claim overwrites an earlier one.
    pub fn build(routes: &[Route], claims: &[ServiceClaim]) -> Self {
        let mut ownership = Self::default();

        for source in OwnershipSource::PRECEDENCE {
            match source {
                OwnershipSource::RouteListing => {
                    for route in routes {
                        for pattern in &route.journey_pattern_section_refs {
                            ownership.record(pattern.clone(), route.id.clone(), source);
                        }
                    }
                }
                OwnershipSource::ServiceDeclaration => {
                    for claim in claims {
                        ownership.record(claim.pattern.clone(), claim.route.clone(), source);
                    }
                }
            }
        }

        debug!(patterns = ownership.len(), "resolved pattern ownership");
        ownership
    }

    fn record(&mut self, pattern: JourneyPatternId, route: RouteId, source: OwnershipSource) {
        if let Some((previous, previous_source)) = self.owners.get(&pattern)
            && *previous != route
        {
            debug!(
                pattern = %pattern,
                previous = %previous,
                ?previous_source,
                route = %route,
                ?source,
                "pattern ownership overwritten"
            );
        }
        self.owners.insert(pattern, (route, source));
    }

    pub fn route_of(&self, pattern: &JourneyPatternId) -> Option<&RouteId> {
        self.owners.get(pattern).map(|(route, _)| route)
    }

    /// Which source supplied the winning claim.
    pub fn source_of(&self, pattern: &JourneyPatternId) -> Option<OwnershipSource> {
        self.owners.get(pattern).map(|(_, source)| *source)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Route → line, taken from each route's own line reference.
#[derive(Debug, Clone, Default)]
pub struct LineOwnership {
    lines: HashMap<RouteId, LineId>,
}

impl LineOwnership {
    pub fn from_routes(routes: &[Route]) -> Self {
        let lines = routes
            .iter()
            .filter_map(|r| Some((r.id.clone(), r.line_ref.clone()?)))
            .collect();
        Self { lines }
    }

    pub fn line_of(&self, route: &RouteId) -> Option<&LineId> {
        self.lines.get(route)
    }
}

/// Pattern → line, for every pattern whose chain fully resolves.
#[derive(Debug, Clone, Default)]
pub struct PatternLines {
    lines: HashMap<JourneyPatternId, LineId>,
}

impl PatternLines {
    pub fn line_of(&self, pattern: &JourneyPatternId) -> Option<&LineId> {
        self.lines.get(pattern)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Compose pattern → route → line for every pattern in the table.
///
/// A pattern is left out when it has no owning route, its route has no
/// line, or that line is not in `known_lines`.
pub fn resolve_pattern_lines(
    patterns: &PatternTable,
    ownership: &PatternOwnership,
    line_ownership: &LineOwnership,
    known_lines: &HashSet<LineId>,
) -> PatternLines {
    let mut lines = HashMap::new();

    for pattern in patterns.iter() {
        let Some(route) = ownership.route_of(&pattern.id) else {
            debug!(pattern = %pattern.id, "journey pattern has no owning route");
            continue;
        };
        let Some(line) = line_ownership.line_of(route) else {
            debug!(pattern = %pattern.id, route = %route, "owning route has no line");
            continue;
        };
        if !known_lines.contains(line) {
            warn!(pattern = %pattern.id, route = %route, line = %line, "route references unknown line");
            continue;
        }
        lines.insert(pattern.id.clone(), line.clone());
    }

    debug!(
        resolved = lines.len(),
        patterns = patterns.len(),
        "resolved pattern lines"
    );
    PatternLines { lines }
}
