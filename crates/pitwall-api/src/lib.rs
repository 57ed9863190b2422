//! HTTP API for the Pitwall statistics engine.
//!
//! This crate exposes every engine operation as a read-only JSON endpoint
//! under `/api`, for consumption by the dashboard. Handlers hold no state
//! beyond a shared [`pitwall_stats::Dataset`] handle.
//!
//! # Modules
//!
//! - [`handlers`] -- One handler per endpoint, plus the route table
//! - [`router`] -- Route assembly, CORS and tracing layers
//! - [`server`] -- Bind, serve, graceful shutdown
//! - [`state`] -- Shared application state
//! - [`error`] -- Error to HTTP response mapping

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
