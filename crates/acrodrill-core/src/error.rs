//! Typed errors for data-model conversion and progress persistence.
//!
//! Loading code mostly propagates `anyhow::Error`; these types exist where a
//! caller needs to classify the failure without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while converting raw values into model types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Domain numbers run from 1 to 5.
    #[error("domain must be between 1 and 5, got {0}")]
    InvalidDomain(u8),

    /// Difficulty tiers run from 1 to 3.
    #[error("difficulty must be between 1 and 3, got {0}")]
    InvalidDifficulty(u8),

    /// Not one of `quick`, `standard`, `full`.
    #[error("unknown exam preset: {0}")]
    UnknownPreset(String),

    /// Not one of the catalogue category tags.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// Not `left`/`practice` or `right`/`confident`.
    #[error("unknown swipe direction: {0}")]
    UnknownSwipe(String),
}

/// Errors from a progress store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// User ids become directory names, so path separators are refused.
    #[error("invalid user id: {0:?}")]
    InvalidUser(String),

    /// A persisted progress or history file could not be decoded.
    #[error("corrupt store file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying filesystem failure.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` if retrying the same call cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, StoreError::InvalidUser(_) | StoreError::Corrupt { .. })
    }
}
