//! Error types for the data layer.
//!
//! [`DbError`] only covers pool setup. Once a pool is serving queries, scan
//! failures are logged here and surface to callers as the detail-free
//! [`pitwall_stats::DatasetError::Unavailable`].

/// Errors that can occur while setting up the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
