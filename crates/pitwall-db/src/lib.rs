//! `PostgreSQL` dataset adapter for the Pitwall statistics engine.
//!
//! Reads the historical results schema (`races`, `results`,
//! `driver_standings`, `constructor_standings`, `pit_stops`, `lap_times`,
//! `drivers`, `constructors`, `circuits`, `status`) and serves it through
//! the [`pitwall_stats::Dataset`] contract. The schema is loaded and owned
//! externally; this crate never writes.
//!
//! # Modules
//!
//! - [`postgres`] -- Connection pool and configuration
//! - [`dataset`] -- Filtered scans behind the dataset contract
//! - [`error`] -- Setup error types

pub mod dataset;
pub mod error;
pub mod postgres;
mod rows;

// Re-export primary types for convenience.
pub use error::DbError;
pub use postgres::{PostgresConfig, PostgresPool};
