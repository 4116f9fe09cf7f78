//! Stop annotation merging.
//!
//! Once every pattern knows its line, each stop on a pattern learns that the
//! line serves it and which stops the line continues to from there. A stop
//! may sit on many patterns of the same line; only the first pattern that
//! yields direction facts for a (stop, line) pair contributes them.
//!
//! A stop that only ever appears as the last stop of its line's patterns
//! has no outgoing edge, produces no direction facts, and so is never
//! annotated with that line. This is a known gap, kept on purpose so that
//! output stays comparable with earlier imports.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, trace};

use crate::domain::{DirectionRecord, JourneyPattern, LineId, OrderedSet, StopId};
use crate::extract::PatternTable;
use crate::store::{StoreError, Update, UpdateOne, to_value};

use super::ownership::PatternLines;

/// Additive update for one stop: gain `line` and each direction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopMerge {
    pub stop: StopId,
    pub line: LineId,
    pub directions: Vec<DirectionRecord>,
}

impl StopMerge {
    /// The store operation applying this merge.
    ///
    /// Both fields are added with set semantics, so applying the same merge
    /// twice leaves the document unchanged the second time.
    pub fn to_update(&self) -> Result<UpdateOne, StoreError> {
        let directions = self
            .directions
            .iter()
            .map(to_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UpdateOne::by_id(
            self.stop.as_str(),
            Update::new()
                .add_to_set("lines", vec![to_value(&self.line)?])
                .add_to_set("directions", directions),
        ))
    }
}

/// Outgoing edges of a pattern: from-stop → direction → next stops.
type Outgoing<'a> = HashMap<&'a StopId, BTreeMap<&'a str, OrderedSet<&'a StopId>>>;

fn outgoing_edges(pattern: &JourneyPattern) -> Outgoing<'_> {
    let mut outgoing: Outgoing<'_> = HashMap::new();
    for edge in &pattern.timing_edges {
        if edge.direction.is_empty() {
            continue;
        }
        outgoing
            .entry(&edge.from_stop)
            .or_default()
            .entry(edge.direction.as_str())
            .or_default()
            .insert(&edge.to_stop);
    }
    outgoing
}

/// Accumulates stop merges across patterns within one run.
#[derive(Debug, Default)]
pub struct AnnotationMerger {
    processed: HashSet<(StopId, LineId)>,
    merges: Vec<StopMerge>,
}

impl AnnotationMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive merges for every stop of `pattern`, which is served by `line`.
    pub fn add_pattern(&mut self, pattern: &JourneyPattern, line: &LineId) {
        let outgoing = outgoing_edges(pattern);

        for (sequence, stop) in pattern.stop_sequence.iter().enumerate() {
            let key = (stop.clone(), line.clone());
            if self.processed.contains(&key) {
                continue;
            }

            let directions: Vec<DirectionRecord> = outgoing
                .get(stop)
                .into_iter()
                .flatten()
                .flat_map(|(direction, next_stops)| {
                    next_stops.iter().map(move |next| DirectionRecord {
                        line: line.clone(),
                        direction: (*direction).to_string(),
                        next_stop: (*next).clone(),
                        sequence,
                    })
                })
                .collect();

            if directions.is_empty() {
                trace!(stop = %stop, line = %line, pattern = %pattern.id, "no outgoing edge, stop not annotated");
                continue;
            }

            self.processed.insert(key);
            self.merges.push(StopMerge {
                stop: stop.clone(),
                line: line.clone(),
                directions,
            });
        }
    }

    pub fn into_merges(self) -> Vec<StopMerge> {
        self.merges
    }
}

/// Derive stop merges for every pattern with a resolved line, in pattern
/// table order.
pub fn merge_annotations(patterns: &PatternTable, pattern_lines: &PatternLines) -> Vec<StopMerge> {
    let mut merger = AnnotationMerger::new();
    for pattern in patterns.iter() {
        if let Some(line) = pattern_lines.line_of(&pattern.id) {
            merger.add_pattern(pattern, line);
        }
    }
    let merges = merger.into_merges();
    debug!(merges = merges.len(), "derived stop annotations");
    merges
}
