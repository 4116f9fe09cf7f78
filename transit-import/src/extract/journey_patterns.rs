//! Journey pattern construction from timing-link chains.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::domain::{DEFAULT_DIRECTION, JourneyPattern, JourneyPatternId, OrderedSet, TimingEdge};
use crate::txc::JourneyPatternSection;

use super::{end_stop, parse_run_time};

/// Build one journey pattern from a pattern section.
///
/// Links are walked in source order; each link contributes its `from` and
/// then its `to` stop to the sequence unless already present. Edges missing
/// either endpoint are dropped after the walk. Returns `None` only when the
/// section has no identifier.
pub fn build_journey_pattern(section: &JourneyPatternSection) -> Option<JourneyPattern> {
    let Some(id) = section
        .id
        .as_deref()
        .and_then(|s| JourneyPatternId::new(s).ok())
    else {
        warn!("skipping journey pattern section without identifier");
        return None;
    };

    let links = &section.journey_pattern_timing_link;
    let mut stop_sequence = OrderedSet::new();
    let mut candidates = Vec::with_capacity(links.len());

    for link in links {
        let from = end_stop(link.from.as_ref());
        let to = end_stop(link.to.as_ref());

        if let Some(from) = &from {
            stop_sequence.insert(from.clone());
        }
        if let Some(to) = &to {
            stop_sequence.insert(to.clone());
        }

        candidates.push((link, from, to));
    }

    let timing_edges: Vec<TimingEdge> = candidates
        .into_iter()
        .filter_map(|(link, from, to)| {
            Some(TimingEdge {
                link_id: link.id.clone(),
                from_stop: from?,
                to_stop: to?,
                direction: link
                    .direction
                    .clone()
                    .unwrap_or_else(|| DEFAULT_DIRECTION.to_string()),
                run_time: parse_run_time(link.run_time.as_deref(), id.as_str()),
                route_link_ref: link.route_link_ref.clone(),
            })
        })
        .collect();

    if timing_edges.len() < links.len() {
        debug!(
            pattern = %id,
            dropped = links.len() - timing_edges.len(),
            "dropped timing links with a missing endpoint"
        );
    }
    trace!(pattern = %id, stops = stop_sequence.len(), "built journey pattern");

    Some(JourneyPattern {
        id,
        stop_sequence,
        timing_edges,
    })
}

/// Journey patterns in source order, indexed by identifier.
#[derive(Debug, Clone, Default)]
pub struct PatternTable {
    patterns: Vec<JourneyPattern>,
    index: HashMap<JourneyPatternId, usize>,
}

impl PatternTable {
    /// Add a pattern; a second pattern with the same identifier is ignored.
    ///
    /// Returns `true` if the pattern was added.
    pub fn insert(&mut self, pattern: JourneyPattern) -> bool {
        if self.index.contains_key(&pattern.id) {
            warn!(pattern = %pattern.id, "duplicate journey pattern section, keeping first");
            return false;
        }
        self.index.insert(pattern.id.clone(), self.patterns.len());
        self.patterns.push(pattern);
        true
    }

    pub fn get(&self, id: &JourneyPatternId) -> Option<&JourneyPattern> {
        self.index.get(id).map(|&i| &self.patterns[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JourneyPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn as_slice(&self) -> &[JourneyPattern] {
        &self.patterns
    }
}

impl FromIterator<JourneyPattern> for PatternTable {
    fn from_iter<I: IntoIterator<Item = JourneyPattern>>(iter: I) -> Self {
        let mut table = Self::default();
        for pattern in iter {
            table.insert(pattern);
        }
        table
    }
}

/// Build the pattern table for every section in the document.
pub fn build_journey_patterns(sections: &[JourneyPatternSection]) -> PatternTable {
    let table: PatternTable = sections.iter().filter_map(build_journey_pattern).collect();
    debug!(count = table.len(), "built journey patterns");
    table
}
