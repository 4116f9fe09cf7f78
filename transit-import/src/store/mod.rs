//! Document store abstraction.
//!
//! The importer writes plain JSON documents keyed by `_id` into named
//! collections through the [`DocumentStore`] trait. Updates use two
//! operators: `$set` replaces fields and `$addToSet` appends each value not
//! already present in an array field.

mod error;
mod memory;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use serde_json::{Map, Value};

pub use error::StoreError;
pub use memory::MemoryStore;

/// A stored document.
pub type Document = Map<String, Value>;

/// Output collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Stops,
    Lines,
    StopAreas,
    AdministrativeAreas,
    JourneyPatterns,
    Routes,
    VehicleJourneys,
    ServiceCalendars,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Stops,
        Collection::Lines,
        Collection::StopAreas,
        Collection::AdministrativeAreas,
        Collection::JourneyPatterns,
        Collection::Routes,
        Collection::VehicleJourneys,
        Collection::ServiceCalendars,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Stops => "stops",
            Collection::Lines => "lines",
            Collection::StopAreas => "stop_areas",
            Collection::AdministrativeAreas => "administrative_areas",
            Collection::JourneyPatterns => "journey_patterns",
            Collection::Routes => "routes",
            Collection::VehicleJourneys => "vehicle_journeys",
            Collection::ServiceCalendars => "service_calendars",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Serialize any value for use inside an update.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    Ok(serde_json::to_value(value)?)
}

/// Serialize an entity into a document, which must carry a string `_id`.
pub fn to_document<T: Serialize>(
    collection: Collection,
    entity: &T,
) -> Result<Document, StoreError> {
    match to_value(entity)? {
        Value::Object(doc) if document_id(&doc).is_some() => Ok(doc),
        _ => Err(StoreError::MissingId {
            collection: collection.name(),
        }),
    }
}

/// The `_id` of a document, when it is a string.
pub fn document_id(doc: &Document) -> Option<&str> {
    doc.get("_id").and_then(Value::as_str)
}

/// Field changes applied to one matched document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    set: Document,
    add_to_set: Vec<(String, Vec<Value>)>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace `field` with `value`.
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set.insert(field.into(), value);
        self
    }

    /// Replace every field of `doc` except `_id`.
    pub fn set_all(mut self, doc: &Document) -> Self {
        for (field, value) in doc {
            if field != "_id" {
                self.set.insert(field.clone(), value.clone());
            }
        }
        self
    }

    /// Append each of `values` to the array `field` unless already present.
    pub fn add_to_set(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        let field = field.into();
        match self.add_to_set.iter_mut().find(|(f, _)| *f == field) {
            Some((_, existing)) => existing.extend(values),
            None => self.add_to_set.push((field, values)),
        }
        self
    }

    pub fn set_fields(&self) -> &Document {
        &self.set
    }

    pub fn add_to_set_fields(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.add_to_set
            .iter()
            .map(|(field, values)| (field.as_str(), values.as_slice()))
    }

    pub fn add_to_set_values(&self, field: &str) -> Option<&[Value]> {
        self.add_to_set_fields()
            .find(|(f, _)| *f == field)
            .map(|(_, values)| values)
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.add_to_set.is_empty()
    }
}

/// Which documents an update applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// The document with this `_id`, if any
    Id(String),
}

/// One `{filter, update}` pair of a bulk update.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOne {
    pub filter: Filter,
    pub update: Update,
}

impl UpdateOne {
    pub fn by_id(id: impl Into<String>, update: Update) -> Self {
        Self {
            filter: Filter::Id(id.into()),
            update,
        }
    }

    pub fn filter_id(&self) -> &str {
        match &self.filter {
            Filter::Id(id) => id,
        }
    }
}

/// Outcome of a bulk update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkUpdateResult {
    /// Updates whose filter matched a document
    pub matched: usize,
    /// Matched documents that actually changed
    pub modified: usize,
}

/// Index key types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    Ascending,
    Geo2dSphere,
}

impl IndexKind {
    fn suffix(self) -> &'static str {
        match self {
            IndexKind::Ascending => "1",
            IndexKind::Geo2dSphere => "2dsphere",
        }
    }
}

/// A named index over one or more fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexModel {
    pub name: String,
    pub keys: Vec<(String, IndexKind)>,
}

impl IndexModel {
    /// An index named after its keys, e.g. `lineRef_1_departureTime_1`.
    pub fn new(keys: &[(&str, IndexKind)]) -> Self {
        let name = keys
            .iter()
            .map(|(field, kind)| format!("{field}_{}", kind.suffix()))
            .collect::<Vec<_>>()
            .join("_");
        Self {
            name,
            keys: keys
                .iter()
                .map(|(field, kind)| ((*field).to_string(), *kind))
                .collect(),
        }
    }

    pub fn ascending(field: &str) -> Self {
        Self::new(&[(field, IndexKind::Ascending)])
    }

    pub fn geo(field: &str) -> Self {
        Self::new(&[(field, IndexKind::Geo2dSphere)])
    }

    /// Override the derived name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Batch-write interface to the output store.
///
/// Operations on different collections are independent. Within a
/// collection, writes are visible to every operation issued after they
/// complete.
pub trait DocumentStore: Send + Sync {
    /// Remove every document from `collection`, returning how many.
    fn clear_collection(
        &self,
        collection: Collection,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Insert `documents` in chunks of at most `max_batch_size`.
    ///
    /// A duplicate `_id` aborts with [`StoreError::DuplicateKey`]; chunks
    /// written before the failing one stay written.
    fn insert_batch(
        &self,
        collection: Collection,
        documents: Vec<Document>,
        max_batch_size: usize,
    ) -> impl Future<Output = Result<usize, StoreError>> + Send;

    /// Apply independent updates in any order. Filters that match nothing
    /// are not an error.
    ///
    /// An update that cannot be applied leaves its document unchanged and
    /// does not stop the others; the first such failure is returned once
    /// every update has been tried.
    fn bulk_update(
        &self,
        collection: Collection,
        updates: Vec<UpdateOne>,
    ) -> impl Future<Output = Result<BulkUpdateResult, StoreError>> + Send;

    /// Create an index; repeating an identical request is a no-op.
    fn create_index(
        &self,
        collection: Collection,
        index: IndexModel,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Flush and release the store.
    fn close(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
