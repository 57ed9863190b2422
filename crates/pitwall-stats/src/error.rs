//! Error types for the statistics engine.
//!
//! Only two failure modes reach callers: a request that is invalid before
//! any data is touched, and a dataset that could not answer. A requested
//! entity that does not exist is not an error; it yields an absent `info`
//! record and empty lists.

/// Failure reported by a dataset collaborator.
///
/// Carries no diagnostic text. Implementations log the underlying cause
/// themselves before returning this, so storage internals never travel
/// past the dataset boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    /// The dataset could not be reached or a scan failed.
    #[error("dataset unavailable")]
    Unavailable,
}

/// Errors returned by the query operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsError {
    /// A required parameter was missing or out of its domain.
    #[error("{0}")]
    Validation(String),

    /// The dataset collaborator failed. Deliberately detail-free.
    #[error("dataset unavailable")]
    DatasetUnavailable,
}

impl From<DatasetError> for StatsError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::Unavailable => Self::DatasetUnavailable,
        }
    }
}
