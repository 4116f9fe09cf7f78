//! Staged import orchestration.
//!
//! Stages run strictly in order, each on fully built inputs:
//! 1. load the document and extract flat entities
//! 2. build journey patterns, then expand routes against them
//! 3. replace the entity collections in the store
//! 4. resolve pattern lines and merge stop annotations
//! 5. replace vehicle journeys, upsert service calendars
//! 6. create indexes
//!
//! Annotation merges are only issued after the stop and route collections
//! are written, so every merge finds its stop document.

mod config;

use std::collections::{BTreeMap, HashSet};

use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::{LineId, ServiceCalendar};
use crate::error::ImportError;
use crate::extract::{
    build_journey_patterns, expand_routes, extract_administrative_areas, extract_calendars,
    extract_lines, extract_stop_areas, extract_stops, extract_vehicle_journeys,
};
use crate::resolve::{
    LineOwnership, PatternOwnership, StopMerge, merge_annotations, resolve_pattern_lines,
    service_claims,
};
use crate::store::{
    BulkUpdateResult, Collection, DocumentStore, IndexKind, IndexModel, StoreError, Update,
    UpdateOne, to_document,
};
use crate::txc::{self, TransXChange};

pub use config::ImportConfig;

/// What one import run wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Documents inserted per collection
    pub inserted: BTreeMap<Collection, usize>,
    /// Patterns whose line was resolved
    pub resolved_patterns: usize,
    /// Stop merges issued
    pub stop_merges: usize,
    /// Stop documents changed by the merges
    pub stops_annotated: usize,
    /// Calendars that already existed and were updated
    pub calendars_updated: usize,
    /// Indexes requested
    pub indexes: usize,
}

impl ImportSummary {
    pub fn inserted(&self, collection: Collection) -> usize {
        self.inserted.get(&collection).copied().unwrap_or(0)
    }
}

/// Indexes downstream queries rely on.
pub fn required_indexes() -> Vec<(Collection, IndexModel)> {
    vec![
        (Collection::Stops, IndexModel::geo("location")),
        (Collection::Stops, IndexModel::ascending("lines")),
        (Collection::Routes, IndexModel::ascending("lineRef")),
        (
            Collection::VehicleJourneys,
            IndexModel::new(&[
                ("lineRef", IndexKind::Ascending),
                ("departureTime", IndexKind::Ascending),
            ]),
        ),
        (
            Collection::VehicleJourneys,
            IndexModel::ascending("stopPoints.stopRef"),
        ),
    ]
}

/// Load the configured document, import it, and close the store.
///
/// The store is closed on every path. If the import fails, a close failure
/// is only logged and the import error is returned.
pub async fn run_import<S: DocumentStore>(
    store: &S,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    let outcome = load_and_import(store, config).await;

    match (outcome, store.close().await) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(e)) => Err(e.into()),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            error!(error = %close_err, "failed to close store after failed import");
            Err(e)
        }
    }
}

async fn load_and_import<S: DocumentStore>(
    store: &S,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    config.validate()?;
    info!(input = %config.input.display(), "loading schedule document");
    let document = txc::load_document(&config.input)?;
    import_document(store, &document, config).await
}

/// Import an already loaded document. Does not close the store.
pub async fn import_document<S: DocumentStore>(
    store: &S,
    document: &TransXChange,
    config: &ImportConfig,
) -> Result<ImportSummary, ImportError> {
    config.validate()?;
    let mut summary = ImportSummary::default();

    let stops = extract_stops(document.stop_points());
    let lines = extract_lines(document.lines());
    let stop_areas = extract_stop_areas(document.stop_areas());
    let admin_areas = extract_administrative_areas(document.administrative_areas());
    let patterns = build_journey_patterns(document.journey_pattern_sections());
    let routes = expand_routes(document.routes(), &patterns);
    info!(
        stops = stops.len(),
        lines = lines.len(),
        patterns = patterns.len(),
        routes = routes.len(),
        "extracted entities"
    );

    let writes = [
        (Collection::Stops, replace_collection(store, Collection::Stops, &stops, config).await?),
        (Collection::Lines, replace_collection(store, Collection::Lines, &lines, config).await?),
        (
            Collection::StopAreas,
            replace_collection(store, Collection::StopAreas, &stop_areas, config).await?,
        ),
        (
            Collection::AdministrativeAreas,
            replace_collection(store, Collection::AdministrativeAreas, &admin_areas, config)
                .await?,
        ),
        (
            Collection::JourneyPatterns,
            replace_collection(store, Collection::JourneyPatterns, patterns.as_slice(), config)
                .await?,
        ),
        (Collection::Routes, replace_collection(store, Collection::Routes, &routes, config).await?),
    ];
    summary.inserted.extend(writes);

    let claims = service_claims(document.services());
    let ownership = PatternOwnership::build(&routes, &claims);
    let line_ownership = LineOwnership::from_routes(&routes);
    let known_lines: HashSet<LineId> = lines.iter().map(|l| l.id.clone()).collect();
    let pattern_lines = resolve_pattern_lines(&patterns, &ownership, &line_ownership, &known_lines);
    summary.resolved_patterns = pattern_lines.len();

    let merges = merge_annotations(&patterns, &pattern_lines);
    summary.stop_merges = merges.len();
    let merged = apply_stop_merges(store, &merges).await?;
    summary.stops_annotated = merged.modified;
    info!(
        merges = merges.len(),
        matched = merged.matched,
        modified = merged.modified,
        "merged stop annotations"
    );

    let journeys = extract_vehicle_journeys(document.vehicle_journeys());
    let written =
        replace_collection(store, Collection::VehicleJourneys, &journeys, config).await?;
    summary.inserted.insert(Collection::VehicleJourneys, written);

    let calendars = extract_calendars(document.service_calendars());
    let (inserted, updated) = upsert_calendars(store, &calendars).await?;
    summary.inserted.insert(Collection::ServiceCalendars, inserted);
    summary.calendars_updated = updated;

    summary.indexes = create_indexes(store).await?;

    info!(
        stops = summary.inserted(Collection::Stops),
        lines = summary.inserted(Collection::Lines),
        routes = summary.inserted(Collection::Routes),
        vehicle_journeys = summary.inserted(Collection::VehicleJourneys),
        calendars = summary.inserted(Collection::ServiceCalendars),
        calendars_updated = summary.calendars_updated,
        resolved_patterns = summary.resolved_patterns,
        stops_annotated = summary.stops_annotated,
        "import complete"
    );
    Ok(summary)
}

/// Clear (when configured) and rewrite one entity collection.
async fn replace_collection<S, T>(
    store: &S,
    collection: Collection,
    entities: &[T],
    config: &ImportConfig,
) -> Result<usize, StoreError>
where
    S: DocumentStore,
    T: Serialize,
{
    if config.clear_collections {
        store.clear_collection(collection).await?;
    }
    let documents = entities
        .iter()
        .map(|e| to_document(collection, e))
        .collect::<Result<Vec<_>, _>>()?;
    let inserted = store
        .insert_batch(collection, documents, config.batch_size)
        .await?;
    debug!(collection = %collection, inserted, "wrote collection");
    Ok(inserted)
}

/// Apply stop merges as one unordered bulk update.
pub async fn apply_stop_merges<S: DocumentStore>(
    store: &S,
    merges: &[StopMerge],
) -> Result<BulkUpdateResult, StoreError> {
    if merges.is_empty() {
        return Ok(BulkUpdateResult::default());
    }
    let updates = merges
        .iter()
        .map(StopMerge::to_update)
        .collect::<Result<Vec<_>, _>>()?;
    let result = store.bulk_update(Collection::Stops, updates).await?;
    if result.matched < merges.len() {
        warn!(
            merges = merges.len(),
            matched = result.matched,
            "some stop merges found no stop document"
        );
    }
    Ok(result)
}

/// Insert each calendar, turning an identifier clash into an update of the
/// stored document. Returns (inserted, updated).
pub async fn upsert_calendars<S: DocumentStore>(
    store: &S,
    calendars: &[ServiceCalendar],
) -> Result<(usize, usize), StoreError> {
    let mut inserted = 0;
    let mut updated = 0;

    for calendar in calendars {
        let doc = to_document(Collection::ServiceCalendars, calendar)?;
        match store
            .insert_batch(Collection::ServiceCalendars, vec![doc.clone()], 1)
            .await
        {
            Ok(n) => inserted += n,
            Err(StoreError::DuplicateKey { .. }) => {
                debug!(calendar = %calendar.id, "calendar exists, updating");
                store
                    .bulk_update(
                        Collection::ServiceCalendars,
                        vec![UpdateOne::by_id(&calendar.id, Update::new().set_all(&doc))],
                    )
                    .await?;
                updated += 1;
            }
            Err(e) => return Err(e),
        }
    }

    debug!(inserted, updated, "wrote service calendars");
    Ok((inserted, updated))
}

/// Create every required index, returning how many were requested.
pub async fn create_indexes<S: DocumentStore>(store: &S) -> Result<usize, StoreError> {
    let indexes = required_indexes();
    let count = indexes.len();
    try_join_all(
        indexes
            .into_iter()
            .map(|(collection, index)| store.create_index(collection, index)),
    )
    .await?;
    debug!(count, "created indexes");
    Ok(count)
}
