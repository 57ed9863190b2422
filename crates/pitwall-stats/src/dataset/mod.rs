//! Dataset access contract consumed by every query operation.
//!
//! A [`Dataset`] hands out one [`DatasetSession`] per logical query. The
//! session is an owned handle (a pooled connection for `PostgreSQL`, a
//! shared reference for [`MemoryDataset`]) that is released when dropped,
//! so every exit path, including `?` on an error and an abandoned future,
//! gives it back.
//!
//! Sessions only answer filtered scans. Rows come back in no particular
//! order; grouping, ordering, percentiles and pagination happen in the
//! engine.

use async_trait::async_trait;
use pitwall_types::{
    Circuit, CircuitId, Constructor, ConstructorId, Driver, DriverId, EntityId, EntityKind,
    LapTime, PitStop, Race, RaceId, RaceResult, StandingsEntry, Status,
};

use crate::error::DatasetError;

pub mod memory;

pub use memory::{MemoryData, MemoryDataset};

/// Equality filters over races. `None` fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaceFilter {
    /// Season year.
    pub year: Option<i32>,
    /// A single race.
    pub race_id: Option<RaceId>,
    /// Races held at one circuit.
    pub circuit_id: Option<CircuitId>,
}

/// Equality filters over race results. `None` fields do not filter.
///
/// Results whose race is unknown to the dataset are never returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultFilter {
    /// Season year of the result's race.
    pub year: Option<i32>,
    /// A single race.
    pub race_id: Option<RaceId>,
    /// One driver.
    pub driver_id: Option<DriverId>,
    /// One constructor.
    pub constructor_id: Option<ConstructorId>,
    /// Races held at one circuit.
    pub circuit_id: Option<CircuitId>,
    /// Exact classified finishing position (e.g. `Some(1)` for winners).
    pub position: Option<i32>,
}

/// Equality filters over standings entries. `None` fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StandingsFilter {
    /// Season year of the entry's race.
    pub year: Option<i32>,
    /// A single race.
    pub race_id: Option<RaceId>,
    /// One driver or constructor. Must match the scanned kind.
    pub entity: Option<EntityId>,
}

/// Equality filters over pit stops and lap times. `None` fields do not filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimingFilter {
    /// Season year of the race.
    pub year: Option<i32>,
    /// A single race.
    pub race_id: Option<RaceId>,
    /// One driver.
    pub driver_id: Option<DriverId>,
}

/// Source of dataset sessions.
#[async_trait]
pub trait Dataset: Send + Sync {
    /// Acquire a handle for one logical query.
    async fn session(&self) -> Result<Box<dyn DatasetSession>, DatasetError>;
}

/// Filtered scans over the stored entities, bound to one acquired handle.
#[async_trait]
pub trait DatasetSession: Send {
    /// Distinct season years that have at least one race.
    async fn seasons(&mut self) -> Result<Vec<i32>, DatasetError>;

    /// Races matching `filter`.
    async fn races(&mut self, filter: &RaceFilter) -> Result<Vec<Race>, DatasetError>;

    /// Race results matching `filter`.
    async fn results(&mut self, filter: &ResultFilter) -> Result<Vec<RaceResult>, DatasetError>;

    /// Driver or constructor standings entries matching `filter`.
    async fn standings(
        &mut self,
        kind: EntityKind,
        filter: &StandingsFilter,
    ) -> Result<Vec<StandingsEntry>, DatasetError>;

    /// Pit stops matching `filter`.
    async fn pit_stops(&mut self, filter: &TimingFilter) -> Result<Vec<PitStop>, DatasetError>;

    /// Lap times matching `filter`.
    async fn lap_times(&mut self, filter: &TimingFilter) -> Result<Vec<LapTime>, DatasetError>;

    /// Drivers with the given identifiers, or every driver for `None`.
    async fn drivers(&mut self, ids: Option<&[DriverId]>) -> Result<Vec<Driver>, DatasetError>;

    /// Constructors with the given identifiers, or every constructor for `None`.
    async fn constructors(
        &mut self,
        ids: Option<&[ConstructorId]>,
    ) -> Result<Vec<Constructor>, DatasetError>;

    /// Circuits with the given identifiers, or every circuit for `None`.
    async fn circuits(&mut self, ids: Option<&[CircuitId]>) -> Result<Vec<Circuit>, DatasetError>;

    /// The full status lookup table.
    async fn statuses(&mut self) -> Result<Vec<Status>, DatasetError>;
}
