//! Document store error types.

use std::path::PathBuf;

/// Errors from the document store primitives.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A document with this `_id` already exists in the collection
    #[error("duplicate key in {collection}: {id}")]
    DuplicateKey { collection: &'static str, id: String },

    /// A document has no string `_id`
    #[error("document in {collection} has no string _id")]
    MissingId { collection: &'static str },

    /// A value could not be converted to a document
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Reading or writing a collection file failed
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A collection file does not contain a list of documents
    #[error("corrupt collection file {path:?}: {message}")]
    Corrupt { path: PathBuf, message: String },

    /// An update cannot be applied to the stored document
    #[error("invalid update on {collection}/{id}: {message}")]
    InvalidUpdate {
        collection: &'static str,
        id: String,
        message: String,
    },

    /// An index with this name exists with different keys
    #[error("index {name} on {collection} already exists with different keys")]
    IndexConflict { collection: &'static str, name: String },

    /// The store has been closed
    #[error("store is closed")]
    Closed,
}
