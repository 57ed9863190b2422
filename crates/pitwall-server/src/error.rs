//! Error types for the server binary.
//!
//! [`ServiceError`] wraps every failure that can stop startup or serving,
//! so `main` can propagate with `?`.

/// Invalid or unreadable environment configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Environment variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Top-level error for the server binary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The database pool could not be created.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: pitwall_db::DbError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: pitwall_api::ServerError,
    },
}
