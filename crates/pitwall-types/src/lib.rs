//! Shared type definitions for the Pitwall statistics engine.
//!
//! This crate is the single source of truth for the entity records the
//! engine reads and the identifier types that key them. Record types flow
//! downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Integer key wrappers for every entity
//! - [`entities`] -- Race, driver, result, standings and timing records
//! - [`points`] -- Per-race versus cumulative championship points

pub mod entities;
pub mod ids;
pub mod points;

// Re-export all public types at crate root for convenience.
pub use entities::{
    Circuit, Constructor, Driver, EntityId, EntityKind, LapTime, PitStop, Race, RaceResult,
    StandingsEntry, Status, display_name,
};
pub use ids::{CircuitId, ConstructorId, DriverId, RaceId, StatusId};
pub use points::{CumulativeStandingPoints, PointsTotal, RacePoints};
