//! Document loading error types.

use std::path::PathBuf;

/// Errors that can occur when reading a schedule document.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The document could not be read from disk
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or does not match the record shapes
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The root value is not a record
    #[error("unexpected document root: expected an object, found {0}")]
    UnexpectedRoot(&'static str),
}
