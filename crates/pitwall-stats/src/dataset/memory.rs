//! In-memory dataset backing tests, fixtures, and offline tooling.
//!
//! Holds every collection as a plain `Vec` behind an [`Arc`], so sessions
//! are cheap clones and concurrent queries share nothing mutable. Scans
//! emulate the `PostgreSQL` adapter's joins: anything keyed on a race that
//! is not in [`MemoryData::races`] is invisible to year and circuit filters
//! and to result scans.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use pitwall_types::{
    Circuit, CircuitId, Constructor, ConstructorId, Driver, DriverId, EntityKind, LapTime,
    PitStop, Race, RaceId, RaceResult, StandingsEntry, Status,
};

use super::{
    Dataset, DatasetSession, RaceFilter, ResultFilter, StandingsFilter, TimingFilter,
};
use crate::error::DatasetError;

/// Raw collections of an in-memory dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryData {
    /// Race calendar.
    pub races: Vec<Race>,
    /// Drivers.
    pub drivers: Vec<Driver>,
    /// Constructors.
    pub constructors: Vec<Constructor>,
    /// Circuits.
    pub circuits: Vec<Circuit>,
    /// Race results.
    pub results: Vec<RaceResult>,
    /// Driver championship standings.
    pub driver_standings: Vec<StandingsEntry>,
    /// Constructor championship standings.
    pub constructor_standings: Vec<StandingsEntry>,
    /// Pit stops.
    pub pit_stops: Vec<PitStop>,
    /// Lap times.
    pub lap_times: Vec<LapTime>,
    /// Status lookup.
    pub statuses: Vec<Status>,
}

impl MemoryData {
    /// Map of race id to race for join emulation.
    fn race_index(&self) -> BTreeMap<RaceId, &Race> {
        self.races.iter().map(|race| (race.race_id, race)).collect()
    }
}

/// A read-only dataset held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    data: Arc<MemoryData>,
}

impl MemoryDataset {
    /// Wrap a set of collections.
    pub fn new(data: MemoryData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }
}

#[async_trait]
impl Dataset for MemoryDataset {
    async fn session(&self) -> Result<Box<dyn DatasetSession>, DatasetError> {
        Ok(Box::new(MemorySession {
            data: Arc::clone(&self.data),
        }))
    }
}

/// Session over a [`MemoryDataset`].
struct MemorySession {
    data: Arc<MemoryData>,
}

/// Whether `race` satisfies the optional year and circuit filters.
fn race_matches(race: &Race, year: Option<i32>, circuit_id: Option<CircuitId>) -> bool {
    year.is_none_or(|y| race.year == y)
        && circuit_id.is_none_or(|c| race.circuit_id == Some(c))
}

/// Keep only rows whose id is selected (`None` selects all).
fn select_ids<T: Clone, K: PartialEq>(
    rows: &[T],
    ids: Option<&[K]>,
    key: impl Fn(&T) -> K,
) -> Vec<T> {
    rows.iter()
        .filter(|row| ids.is_none_or(|ids| ids.contains(&key(row))))
        .cloned()
        .collect()
}

#[async_trait]
impl DatasetSession for MemorySession {
    async fn seasons(&mut self) -> Result<Vec<i32>, DatasetError> {
        let mut years: Vec<i32> = self.data.races.iter().map(|race| race.year).collect();
        years.sort_unstable();
        years.dedup();
        Ok(years)
    }

    async fn races(&mut self, filter: &RaceFilter) -> Result<Vec<Race>, DatasetError> {
        Ok(self
            .data
            .races
            .iter()
            .filter(|race| filter.race_id.is_none_or(|id| race.race_id == id))
            .filter(|race| race_matches(race, filter.year, filter.circuit_id))
            .cloned()
            .collect())
    }

    async fn results(&mut self, filter: &ResultFilter) -> Result<Vec<RaceResult>, DatasetError> {
        let races = self.data.race_index();
        Ok(self
            .data
            .results
            .iter()
            .filter(|res| {
                races
                    .get(&res.race_id)
                    .is_some_and(|race| race_matches(race, filter.year, filter.circuit_id))
            })
            .filter(|res| filter.race_id.is_none_or(|id| res.race_id == id))
            .filter(|res| filter.driver_id.is_none_or(|id| res.driver_id == id))
            .filter(|res| filter.constructor_id.is_none_or(|id| res.constructor_id == id))
            .filter(|res| filter.position.is_none_or(|p| res.position == Some(p)))
            .cloned()
            .collect())
    }

    async fn standings(
        &mut self,
        kind: EntityKind,
        filter: &StandingsFilter,
    ) -> Result<Vec<StandingsEntry>, DatasetError> {
        let source = match kind {
            EntityKind::Driver => &self.data.driver_standings,
            EntityKind::Constructor => &self.data.constructor_standings,
        };
        let races = self.data.race_index();
        Ok(source
            .iter()
            .filter(|entry| {
                races
                    .get(&entry.race_id)
                    .is_some_and(|race| race_matches(race, filter.year, None))
            })
            .filter(|entry| filter.race_id.is_none_or(|id| entry.race_id == id))
            .filter(|entry| filter.entity.is_none_or(|id| entry.entity == id))
            .cloned()
            .collect())
    }

    async fn pit_stops(&mut self, filter: &TimingFilter) -> Result<Vec<PitStop>, DatasetError> {
        let races = self.data.race_index();
        Ok(self
            .data
            .pit_stops
            .iter()
            .filter(|stop| {
                races
                    .get(&stop.race_id)
                    .is_some_and(|race| race_matches(race, filter.year, None))
            })
            .filter(|stop| filter.race_id.is_none_or(|id| stop.race_id == id))
            .filter(|stop| filter.driver_id.is_none_or(|id| stop.driver_id == id))
            .cloned()
            .collect())
    }

    async fn lap_times(&mut self, filter: &TimingFilter) -> Result<Vec<LapTime>, DatasetError> {
        let races = self.data.race_index();
        Ok(self
            .data
            .lap_times
            .iter()
            .filter(|lap| {
                filter.year.is_none()
                    || races
                        .get(&lap.race_id)
                        .is_some_and(|race| race_matches(race, filter.year, None))
            })
            .filter(|lap| filter.race_id.is_none_or(|id| lap.race_id == id))
            .filter(|lap| filter.driver_id.is_none_or(|id| lap.driver_id == id))
            .cloned()
            .collect())
    }

    async fn drivers(&mut self, ids: Option<&[DriverId]>) -> Result<Vec<Driver>, DatasetError> {
        Ok(select_ids(&self.data.drivers, ids, |d| d.driver_id))
    }

    async fn constructors(
        &mut self,
        ids: Option<&[ConstructorId]>,
    ) -> Result<Vec<Constructor>, DatasetError> {
        Ok(select_ids(&self.data.constructors, ids, |c| c.constructor_id))
    }

    async fn circuits(&mut self, ids: Option<&[CircuitId]>) -> Result<Vec<Circuit>, DatasetError> {
        Ok(select_ids(&self.data.circuits, ids, |c| c.circuit_id))
    }

    async fn statuses(&mut self) -> Result<Vec<Status>, DatasetError> {
        Ok(self.data.statuses.clone())
    }
}
