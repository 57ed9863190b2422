//! Entry point for the Pitwall dashboard API.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from the environment
//! 2. Initialize structured logging (tracing)
//! 3. Create the `PostgreSQL` connection pool
//! 4. Serve the API until `Ctrl-C` or `SIGTERM`
//! 5. Close the pool

mod config;
mod error;

use std::sync::Arc;

use pitwall_api::{AppState, ServerConfig};
use pitwall_db::{PostgresConfig, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, ServiceConfig};
use crate::error::ServiceError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the database pool, or the server
/// fails.
#[tokio::main]
async fn main() -> Result<(), ServiceError> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);

    info!("pitwall-server starting");
    info!(
        host = config.host,
        port = config.port,
        max_connections = config.max_connections,
        allowed_origins = config.allowed_origins.len(),
        "configuration loaded"
    );

    let pool = PostgresPool::connect(
        &PostgresConfig::new(&config.database_url)
            .with_max_connections(config.max_connections)
            .with_connect_timeout(config.connect_timeout)
            .with_idle_timeout(config.idle_timeout),
    )
    .await?;

    let state = Arc::new(AppState::new(pool.clone()));
    let server = ServerConfig {
        host: config.host,
        port: config.port,
        allowed_origins: config.allowed_origins,
    };
    let served = pitwall_api::start_server(&server, state).await;

    pool.close().await;
    info!("pitwall-server stopped");
    served.map_err(ServiceError::from)
}

/// Install the global subscriber. `RUST_LOG` overrides the `info` default.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
