//! Repository error handling
//!
//! Store unavailability is an expected state in this system, so most of it
//! travels as data (provenance tags, status payloads) rather than as errors.
//! The variants here cover the cases the orchestrator must hand back to the
//! caller as structured failures.

use thiserror::Error;

/// Errors surfaced by the word repository
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// A required field is missing or empty (caller error)
    #[error("required field '{field}' is missing or empty")]
    Validation { field: &'static str },

    /// Neither the primary nor the embedded store can take the write
    #[error("all storage backends are unavailable; the word was not saved")]
    AllStoresDown,

    /// The surviving store failed mid-operation with no fallback left
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl RepositoryError {
    /// True for caller errors that map to a 400-class response
    pub fn is_validation(&self) -> bool {
        matches!(self, RepositoryError::Validation { .. })
    }
}
