//! In-memory document store with optional JSON directory persistence.
//!
//! Each collection is kept as an insertion-ordered list of documents. When
//! opened on a directory, collections are loaded from `<collection>.json`
//! and written back on close.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::error::StoreError;
use super::{
    BulkUpdateResult, Collection, Document, DocumentStore, IndexModel, Update, UpdateOne,
    document_id,
};

#[derive(Debug, Default)]
struct CollectionData {
    documents: Vec<Document>,
    by_id: HashMap<String, usize>,
    indexes: Vec<IndexModel>,
}

impl CollectionData {
    fn from_documents(collection: Collection, documents: Vec<Document>) -> Result<Self, StoreError> {
        let mut data = Self::default();
        for doc in documents {
            data.insert(collection, doc)?;
        }
        Ok(data)
    }

    fn insert(&mut self, collection: Collection, doc: Document) -> Result<(), StoreError> {
        let id = document_id(&doc)
            .ok_or(StoreError::MissingId {
                collection: collection.name(),
            })?
            .to_string();
        if self.by_id.contains_key(&id) {
            return Err(StoreError::DuplicateKey {
                collection: collection.name(),
                id,
            });
        }
        self.by_id.insert(id, self.documents.len());
        self.documents.push(doc);
        Ok(())
    }

    /// Fail if any document of `chunk` lacks an `_id` or collides with a
    /// stored document or an earlier one in the chunk.
    fn check_chunk(&self, collection: Collection, chunk: &[Document]) -> Result<(), StoreError> {
        let mut ids = HashSet::new();
        for doc in chunk {
            let id = document_id(doc).ok_or(StoreError::MissingId {
                collection: collection.name(),
            })?;
            if self.by_id.contains_key(id) || !ids.insert(id) {
                return Err(StoreError::DuplicateKey {
                    collection: collection.name(),
                    id: id.to_string(),
                });
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> usize {
        let removed = self.documents.len();
        self.documents.clear();
        self.by_id.clear();
        removed
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Document> {
        let index = *self.by_id.get(id)?;
        self.documents.get_mut(index)
    }
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<Collection, CollectionData>,
    closed: bool,
}

impl State {
    fn open_collection(&mut self, collection: Collection) -> Result<&mut CollectionData, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        Ok(self.collections.entry(collection).or_default())
    }
}

/// Apply `update` to `doc`, returning whether it changed.
/// Reject an update that would fail part way, before anything is changed.
fn check_update(collection: Collection, doc: &Document, update: &Update) -> Result<(), StoreError> {
    for (field, _) in update.add_to_set_fields() {
        let target = update.set_fields().get(field).or_else(|| doc.get(field));
        if let Some(value) = target
            && !value.is_array()
        {
            return Err(StoreError::InvalidUpdate {
                collection: collection.name(),
                id: document_id(doc).unwrap_or_default().to_string(),
                message: format!("{field} is not an array"),
            });
        }
    }
    Ok(())
}

/// Apply `update` to `doc`, returning whether anything changed.
///
/// The document is left untouched when the update is invalid.
fn apply_update(
    collection: Collection,
    doc: &mut Document,
    update: &Update,
) -> Result<bool, StoreError> {
    check_update(collection, doc, update)?;
    let mut changed = false;

    for (field, value) in update.set_fields() {
        if doc.get(field) != Some(value) {
            doc.insert(field.clone(), value.clone());
            changed = true;
        }
    }

    for (field, values) in update.add_to_set_fields() {
        let target = doc.entry(field).or_insert_with(|| {
            changed = true;
            Value::Array(Vec::new())
        });
        let Value::Array(items) = target else {
            continue;
        };
        for value in values {
            if !items.contains(value) {
                items.push(value.clone());
                changed = true;
            }
        }
    }

    Ok(changed)
}

/// In-memory [`DocumentStore`].
///
/// Cloning is cheap; clones share the same collections.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
    dir: Option<PathBuf>,
}

impl MemoryStore {
    /// Create an empty store that is never persisted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store persisted under `dir`.
    ///
    /// The directory is created if missing. Existing `<collection>.json`
    /// files are loaded; collections without a file start empty.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut collections = HashMap::new();
        for collection in Collection::ALL {
            let path = collection_path(dir, collection);
            if !path.is_file() {
                continue;
            }

            let json = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let documents: Vec<Document> =
                serde_json::from_str(&json).map_err(|e| StoreError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                })?;
            let data = CollectionData::from_documents(collection, documents).map_err(|e| {
                StoreError::Corrupt {
                    path: path.clone(),
                    message: e.to_string(),
                }
            })?;

            debug!(collection = %collection, documents = data.documents.len(), "loaded collection");
            collections.insert(collection, data);
        }

        Ok(Self {
            state: Arc::new(RwLock::new(State {
                collections,
                closed: false,
            })),
            dir: Some(dir.to_path_buf()),
        })
    }

    /// The persistence directory, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Look up one document by `_id`.
    pub async fn find_by_id(&self, collection: Collection, id: &str) -> Option<Document> {
        let state = self.state.read().await;
        let data = state.collections.get(&collection)?;
        let index = *data.by_id.get(id)?;
        data.documents.get(index).cloned()
    }

    /// Every document of a collection, in insertion order.
    pub async fn documents(&self, collection: Collection) -> Vec<Document> {
        let state = self.state.read().await;
        state
            .collections
            .get(&collection)
            .map(|data| data.documents.clone())
            .unwrap_or_default()
    }

    pub async fn count(&self, collection: Collection) -> usize {
        let state = self.state.read().await;
        state
            .collections
            .get(&collection)
            .map_or(0, |data| data.documents.len())
    }

    /// Indexes created on a collection, in creation order.
    pub async fn indexes(&self, collection: Collection) -> Vec<IndexModel> {
        let state = self.state.read().await;
        state
            .collections
            .get(&collection)
            .map(|data| data.indexes.clone())
            .unwrap_or_default()
    }

    pub async fn is_closed(&self) -> bool {
        self.state.read().await.closed
    }
}

fn collection_path(dir: &Path, collection: Collection) -> PathBuf {
    dir.join(format!("{}.json", collection.name()))
}

impl DocumentStore for MemoryStore {
    async fn clear_collection(&self, collection: Collection) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        let removed = state.open_collection(collection)?.clear();
        debug!(collection = %collection, removed, "cleared collection");
        Ok(removed)
    }

    async fn insert_batch(
        &self,
        collection: Collection,
        documents: Vec<Document>,
        max_batch_size: usize,
    ) -> Result<usize, StoreError> {
        let chunk_size = max_batch_size.max(1);
        let mut state = self.state.write().await;
        let data = state.open_collection(collection)?;

        let mut inserted = 0;
        let mut documents = documents.into_iter().peekable();
        while documents.peek().is_some() {
            let chunk: Vec<Document> = documents.by_ref().take(chunk_size).collect();
            let count = chunk.len();
            data.check_chunk(collection, &chunk)?;
            for doc in chunk {
                data.insert(collection, doc)?;
                inserted += 1;
            }
            debug!(collection = %collection, count, "inserted chunk");
        }
        Ok(inserted)
    }

    async fn bulk_update(
        &self,
        collection: Collection,
        updates: Vec<UpdateOne>,
    ) -> Result<BulkUpdateResult, StoreError> {
        let mut state = self.state.write().await;
        let data = state.open_collection(collection)?;

        let mut result = BulkUpdateResult::default();
        let mut first_error = None;
        let mut failed = 0usize;
        for op in &updates {
            let Some(doc) = data.get_mut(op.filter_id()) else {
                continue;
            };
            result.matched += 1;
            match apply_update(collection, doc, &op.update) {
                Ok(true) => result.modified += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(collection = %collection, id = op.filter_id(), error = %e, "update rejected");
                    failed += 1;
                    first_error.get_or_insert(e);
                }
            }
        }

        debug!(
            collection = %collection,
            updates = updates.len(),
            matched = result.matched,
            modified = result.modified,
            failed,
            "applied bulk update"
        );
        match first_error {
            Some(e) => Err(e),
            None => Ok(result),
        }
    }

    async fn create_index(&self, collection: Collection, index: IndexModel) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let data = state.open_collection(collection)?;

        match data.indexes.iter().find(|existing| existing.name == index.name) {
            Some(existing) if existing.keys == index.keys => Ok(()),
            Some(_) => Err(StoreError::IndexConflict {
                collection: collection.name(),
                name: index.name,
            }),
            None => {
                debug!(collection = %collection, index = %index.name, "created index");
                data.indexes.push(index);
                Ok(())
            }
        }
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.closed {
            return Ok(());
        }

        // Stay open until every file is written so a failed close can be retried
        if let Some(dir) = &self.dir {
            for (collection, data) in &state.collections {
                let path = collection_path(dir, *collection);
                let json = serde_json::to_string_pretty(&data.documents)?;
                std::fs::write(&path, json).map_err(|source| StoreError::Io { path, source })?;
            }
            info!(dir = %dir.display(), collections = state.collections.len(), "store written");
        }

        state.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn docs(ids: &[&str]) -> Vec<Document> {
        ids.iter().map(|id| doc(json!({"_id": id}))).collect()
    }

    #[tokio::test]
    async fn insert_and_find() {
        let store = MemoryStore::new();
        let inserted = store
            .insert_batch(
                Collection::Lines,
                vec![doc(json!({"_id": "L1", "number": "1"}))],
                10,
            )
            .await
            .unwrap();

        assert_eq!(inserted, 1);
        let found = store.find_by_id(Collection::Lines, "L1").await.unwrap();
        assert_eq!(found["number"], json!("1"));
        assert!(store.find_by_id(Collection::Lines, "L2").await.is_none());
        assert!(store.find_by_id(Collection::Stops, "L1").await.is_none());
    }

    #[tokio::test]
    async fn chunking_writes_every_document() {
        let store = MemoryStore::new();
        let ids: Vec<String> = (0..7).map(|i| format!("S{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();

        let inserted = store
            .insert_batch(Collection::Stops, docs(&refs), 3)
            .await
            .unwrap();

        assert_eq!(inserted, 7);
        let stored: Vec<String> = store
            .documents(Collection::Stops)
            .await
            .iter()
            .map(|d| document_id(d).unwrap().to_string())
            .collect();
        assert_eq!(stored, ids);
    }

    #[tokio::test]
    async fn duplicate_key_aborts() {
        let store = MemoryStore::new();
        store
            .insert_batch(Collection::ServiceCalendars, docs(&["C1"]), 10)
            .await
            .unwrap();

        let err = store
            .insert_batch(Collection::ServiceCalendars, docs(&["C2", "C1"]), 10)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey { ref id, .. } if id == "C1"));
        // The failing chunk is not written at all
        assert_eq!(store.count(Collection::ServiceCalendars).await, 1);
    }

    #[tokio::test]
    async fn earlier_chunks_stay_written() {
        let store = MemoryStore::new();

        let err = store
            .insert_batch(Collection::Stops, docs(&["A", "B", "C", "A"]), 2)
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateKey { .. }));
        assert_eq!(store.count(Collection::Stops).await, 2);
        assert!(store.find_by_id(Collection::Stops, "C").await.is_none());
    }

    #[tokio::test]
    async fn clear_removes_documents_keeps_indexes() {
        let store = MemoryStore::new();
        store
            .insert_batch(Collection::Routes, docs(&["R1", "R2"]), 10)
            .await
            .unwrap();
        store
            .create_index(Collection::Routes, IndexModel::ascending("lineRef"))
            .await
            .unwrap();

        let removed = store.clear_collection(Collection::Routes).await.unwrap();

        assert_eq!(removed, 2);
        assert_eq!(store.count(Collection::Routes).await, 0);
        assert_eq!(store.indexes(Collection::Routes).await.len(), 1);
        // Cleared identifiers can be reused
        store
            .insert_batch(Collection::Routes, docs(&["R1"]), 10)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn add_to_set_is_idempotent() {
        let store = MemoryStore::new();
        store
            .insert_batch(
                Collection::Stops,
                vec![doc(json!({"_id": "A", "lines": [], "directions": []}))],
                10,
            )
            .await
            .unwrap();

        let direction = json!({"line": "12", "direction": "outbound", "nextStop": "B", "sequence": 0});
        let update = UpdateOne::by_id(
            "A",
            Update::new()
                .add_to_set("lines", vec![json!("12")])
                .add_to_set("directions", vec![direction.clone(), direction.clone()]),
        );

        let first = store
            .bulk_update(Collection::Stops, vec![update.clone()])
            .await
            .unwrap();
        let second = store
            .bulk_update(Collection::Stops, vec![update])
            .await
            .unwrap();

        assert_eq!(first, BulkUpdateResult { matched: 1, modified: 1 });
        assert_eq!(second, BulkUpdateResult { matched: 1, modified: 0 });

        let stop = store.find_by_id(Collection::Stops, "A").await.unwrap();
        assert_eq!(stop["lines"], json!(["12"]));
        assert_eq!(stop["directions"], json!([direction]));
    }

    #[tokio::test]
    async fn add_to_set_creates_missing_field() {
        let store = MemoryStore::new();
        store
            .insert_batch(Collection::Stops, docs(&["A"]), 10)
            .await
            .unwrap();

        store
            .bulk_update(
                Collection::Stops,
                vec![UpdateOne::by_id(
                    "A",
                    Update::new().add_to_set("lines", vec![json!("7")]),
                )],
            )
            .await
            .unwrap();

        let stop = store.find_by_id(Collection::Stops, "A").await.unwrap();
        assert_eq!(stop["lines"], json!(["7"]));
    }

    #[tokio::test]
    async fn add_to_set_on_scalar_fails() {
        let store = MemoryStore::new();
        store
            .insert_batch(
                Collection::Stops,
                vec![doc(json!({"_id": "A", "lines": "12"}))],
                10,
            )
            .await
            .unwrap();

        let err = store
            .bulk_update(
                Collection::Stops,
                vec![UpdateOne::by_id(
                    "A",
                    Update::new().add_to_set("lines", vec![json!("7")]),
                )],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::InvalidUpdate { .. }));
    }

    #[tokio::test]
    async fn rejected_update_leaves_document_and_siblings_alone() {
        let store = MemoryStore::new();
        store
            .insert_batch(
                Collection::Stops,
                vec![
                    doc(json!({"_id": "A", "name": "Old", "lines": "12"})),
                    doc(json!({"_id": "B", "name": "Bee"})),
                ],
                10,
            )
            .await
            .unwrap();

        let err = store
            .bulk_update(
                Collection::Stops,
                vec![
                    UpdateOne::by_id(
                        "A",
                        Update::new()
                            .set("name", json!("New"))
                            .add_to_set("lines", vec![json!("7")]),
                    ),
                    UpdateOne::by_id("B", Update::new().add_to_set("lines", vec![json!("7")])),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate { ref id, .. } if id == "A"));

        let a = store.find_by_id(Collection::Stops, "A").await.unwrap();
        assert_eq!(a["name"], json!("Old"));
        assert_eq!(a["lines"], json!("12"));
        let b = store.find_by_id(Collection::Stops, "B").await.unwrap();
        assert_eq!(b["lines"], json!(["7"]));
    }

    #[tokio::test]
    async fn set_to_array_then_add_to_set_is_valid() {
        let store = MemoryStore::new();
        store
            .insert_batch(
                Collection::Stops,
                vec![doc(json!({"_id": "A", "lines": "12"}))],
                10,
            )
            .await
            .unwrap();

        store
            .bulk_update(
                Collection::Stops,
                vec![UpdateOne::by_id(
                    "A",
                    Update::new()
                        .set("lines", json!(["12"]))
                        .add_to_set("lines", vec![json!("7")]),
                )],
            )
            .await
            .unwrap();

        let a = store.find_by_id(Collection::Stops, "A").await.unwrap();
        assert_eq!(a["lines"], json!(["12", "7"]));
    }

    #[tokio::test]
    async fn unmatched_update_is_not_an_error() {
        let store = MemoryStore::new();
        let result = store
            .bulk_update(
                Collection::Stops,
                vec![UpdateOne::by_id("GHOST", Update::new().set("name", json!("x")))],
            )
            .await
            .unwrap();
        assert_eq!(result, BulkUpdateResult::default());
        assert_eq!(store.count(Collection::Stops).await, 0);
    }

    #[tokio::test]
    async fn set_replaces_fields() {
        let store = MemoryStore::new();
        store
            .insert_batch(
                Collection::ServiceCalendars,
                vec![doc(json!({"_id": "C1", "dayTypes": ["Weekday"]}))],
                10,
            )
            .await
            .unwrap();

        store
            .bulk_update(
                Collection::ServiceCalendars,
                vec![UpdateOne::by_id(
                    "C1",
                    Update::new().set("dayTypes", json!(["Sunday"])),
                )],
            )
            .await
            .unwrap();

        let cal = store
            .find_by_id(Collection::ServiceCalendars, "C1")
            .await
            .unwrap();
        assert_eq!(cal["dayTypes"], json!(["Sunday"]));
    }

    #[tokio::test]
    async fn index_creation_is_idempotent() {
        let store = MemoryStore::new();
        let index = IndexModel::geo("location");

        store
            .create_index(Collection::Stops, index.clone())
            .await
            .unwrap();
        store.create_index(Collection::Stops, index).await.unwrap();
        assert_eq!(store.indexes(Collection::Stops).await.len(), 1);

        let clash = IndexModel::ascending("lines").with_name("location_2dsphere");
        let err = store
            .create_index(Collection::Stops, clash)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::IndexConflict { .. }));
    }

    #[tokio::test]
    async fn closed_store_rejects_writes() {
        let store = MemoryStore::new();
        store.close().await.unwrap();
        assert!(store.is_closed().await);
        // Closing twice is fine
        store.close().await.unwrap();

        let err = store
            .insert_batch(Collection::Lines, docs(&["L1"]), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Closed));
    }

    #[tokio::test]
    async fn persists_to_directory() {
        let dir = tempdir().unwrap();

        let store = MemoryStore::open(dir.path()).unwrap();
        store
            .insert_batch(Collection::Lines, docs(&["L1", "L2"]), 10)
            .await
            .unwrap();
        store.close().await.unwrap();

        assert!(dir.path().join("lines.json").is_file());
        assert!(!dir.path().join("stops.json").exists());

        let reopened = MemoryStore::open(dir.path()).unwrap();
        assert_eq!(reopened.count(Collection::Lines).await, 2);
        assert!(reopened.find_by_id(Collection::Lines, "L2").await.is_some());
    }

    #[tokio::test]
    async fn failed_close_can_be_retried() {
        let dir = tempdir().unwrap();
        let store = MemoryStore::open(dir.path()).unwrap();
        store
            .insert_batch(Collection::Lines, docs(&["L1"]), 10)
            .await
            .unwrap();

        // A directory in the way makes the write fail
        let target = dir.path().join("lines.json");
        std::fs::create_dir(&target).unwrap();

        let err = store.close().await.unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert!(!store.is_closed().await);

        std::fs::remove_dir(&target).unwrap();
        store.close().await.unwrap();

        assert!(store.is_closed().await);
        assert!(target.is_file());
        let reopened = MemoryStore::open(dir.path()).unwrap();
        assert!(reopened.find_by_id(Collection::Lines, "L1").await.is_some());
    }

    #[tokio::test]
    async fn open_creates_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("out").join("db");

        let store = MemoryStore::open(&nested).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.dir(), Some(nested.as_path()));
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("routes.json"), r#"{"not": "a list"}"#).unwrap();

        let err = MemoryStore::open(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn duplicate_ids_on_disk_are_rejected() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join("routes.json"),
            r#"[{"_id": "R1"}, {"_id": "R1"}]"#,
        )
        .unwrap();

        let err = MemoryStore::open(dir.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate key"));
    }
}
