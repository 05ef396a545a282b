//! Error taxonomy shared by every layer of the records core.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type for record operations.
pub type Result<T> = std::result::Result<T, RecordsError>;

/// Errors surfaced to the presentation layer. Every variant carries enough
/// detail to be shown to the user as-is.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// A field value failed validation. Raised before any store write.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A document or argument described a different entity kind than the
    /// operation expects.
    #[error("expected a {expected} record but found a {found} record")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Identifier collision on create.
    #[error("{entity} {key} already exists.")]
    DuplicateKey { entity: &'static str, key: String },

    /// Update, delete or lookup target is absent.
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// Name-to-identifier resolution found no match.
    #[error("{entity} {name} not found")]
    ReferenceResolution { entity: &'static str, name: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordsError {
    pub(crate) fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub(crate) fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            entity,
            key: key.into(),
        }
    }
}
