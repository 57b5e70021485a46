//! Catalogue-level error type.

use thiserror::Error;

/// Errors returned by an [`crate::ActionCatalogue`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    /// The catalogue could not be reached; callers may try again.
    #[error("action catalogue unavailable: {0}")]
    Unavailable(String),

    /// No action is registered under the requested id.
    #[error("unknown action '{0}'")]
    UnknownAction(String),
}
