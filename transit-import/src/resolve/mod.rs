//! Cross-entity resolution.
//!
//! The source schedule never links a journey pattern to its line directly.
//! [`ownership`] resolves that chain through routes, and [`merge`] turns the
//! resolved pattern lines into additive updates for the stops they serve.

mod merge;
mod ownership;

pub use merge::{AnnotationMerger, StopMerge, merge_annotations};
pub use ownership::{
    LineOwnership, OwnershipSource, PatternLines, PatternOwnership, ServiceClaim,
    resolve_pattern_lines, service_claims,
};
