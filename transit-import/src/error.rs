//! Top-level import error type.

use crate::store::StoreError;
use crate::txc::LoadError;

/// Errors that abort an import run.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The input document could not be loaded
    #[error("failed to load schedule: {0}")]
    Load(#[from] LoadError),

    /// A store operation failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The configuration is invalid
    #[error("invalid configuration: {0}")]
    Config(String),
}
