//! Row shapes returned by the scans and their conversion into entity
//! records.
//!
//! Every query aliases the upstream camelCase columns (`"raceId"`) to the
//! snake_case field names below.

use chrono::NaiveDate;
use pitwall_types::{
    Circuit, CircuitId, Constructor, ConstructorId, CumulativeStandingPoints, Driver, DriverId,
    EntityId, EntityKind, LapTime, PitStop, Race, RaceId, RacePoints, RaceResult,
    StandingsEntry, Status, StatusId,
};

/// A row of `races`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RaceRow {
    pub race_id: i32,
    pub year: Option<i32>,
    pub round: Option<i32>,
    pub name: Option<String>,
    pub circuit_id: Option<i32>,
}

impl RaceRow {
    /// A race without a year or round cannot be placed in a season.
    pub fn into_race(self) -> Option<Race> {
        Some(Race {
            race_id: RaceId(self.race_id),
            year: self.year?,
            round: self.round?,
            name: self.name,
            circuit_id: self.circuit_id.map(CircuitId),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DriverRow {
    pub driver_id: i32,
    pub forename: Option<String>,
    pub surname: Option<String>,
    pub nationality: Option<String>,
    pub dob: Option<NaiveDate>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Self {
            driver_id: DriverId(row.driver_id),
            forename: row.forename,
            surname: row.surname,
            nationality: row.nationality,
            dob: row.dob,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ConstructorRow {
    pub constructor_id: i32,
    pub name: Option<String>,
    pub nationality: Option<String>,
}

impl From<ConstructorRow> for Constructor {
    fn from(row: ConstructorRow) -> Self {
        Self {
            constructor_id: ConstructorId(row.constructor_id),
            name: row.name,
            nationality: row.nationality,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CircuitRow {
    pub circuit_id: i32,
    pub name: Option<String>,
    pub country: Option<String>,
    pub location: Option<String>,
}

impl From<CircuitRow> for Circuit {
    fn from(row: CircuitRow) -> Self {
        Self {
            circuit_id: CircuitId(row.circuit_id),
            name: row.name,
            country: row.country,
            location: row.location,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ResultRow {
    pub race_id: i32,
    pub driver_id: i32,
    pub constructor_id: i32,
    pub grid: Option<i32>,
    pub position: Option<i32>,
    pub points: Option<f64>,
    pub status_id: Option<i32>,
}

impl From<ResultRow> for RaceResult {
    fn from(row: ResultRow) -> Self {
        Self {
            race_id: RaceId(row.race_id),
            driver_id: DriverId(row.driver_id),
            constructor_id: ConstructorId(row.constructor_id),
            grid: row.grid,
            position: row.position,
            points: row.points.map(RacePoints),
            status_id: row.status_id.map(StatusId),
        }
    }
}

/// A row of `driver_standings` or `constructor_standings`; `entity_id` is
/// the driver or constructor key depending on the table.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StandingRow {
    pub race_id: i32,
    pub entity_id: i32,
    pub points: Option<f64>,
    pub position: Option<i32>,
    pub wins: Option<i32>,
}

impl StandingRow {
    pub fn into_entry(self, kind: EntityKind) -> StandingsEntry {
        let entity = match kind {
            EntityKind::Driver => EntityId::Driver(DriverId(self.entity_id)),
            EntityKind::Constructor => EntityId::Constructor(ConstructorId(self.entity_id)),
        };
        StandingsEntry {
            race_id: RaceId(self.race_id),
            entity,
            points: self.points.map(CumulativeStandingPoints),
            position: self.position,
            wins: self.wins,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PitStopRow {
    pub race_id: i32,
    pub driver_id: i32,
    pub stop: i32,
    pub lap: Option<i32>,
    pub milliseconds: Option<i32>,
}

impl From<PitStopRow> for PitStop {
    fn from(row: PitStopRow) -> Self {
        Self {
            race_id: RaceId(row.race_id),
            driver_id: DriverId(row.driver_id),
            stop: row.stop,
            lap: row.lap,
            milliseconds: row.milliseconds,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LapTimeRow {
    pub race_id: i32,
    pub driver_id: i32,
    pub lap: i32,
    pub position: Option<i32>,
    pub milliseconds: Option<i32>,
}

impl From<LapTimeRow> for LapTime {
    fn from(row: LapTimeRow) -> Self {
        Self {
            race_id: RaceId(row.race_id),
            driver_id: DriverId(row.driver_id),
            lap: row.lap,
            position: row.position,
            milliseconds: row.milliseconds,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct StatusRow {
    pub status_id: i32,
    pub status: Option<String>,
}

impl From<StatusRow> for Status {
    fn from(row: StatusRow) -> Self {
        Self {
            status_id: StatusId(row.status_id),
            status: row.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_without_year_is_dropped() {
        let row = RaceRow {
            race_id: 1,
            year: None,
            round: Some(1),
            name: None,
            circuit_id: None,
        };
        assert_eq!(row.into_race(), None);
    }

    #[test]
    fn standing_row_takes_the_entity_kind_of_its_table() {
        let row = StandingRow {
            race_id: 1074,
            entity_id: 6,
            points: Some(409.0),
            position: Some(1),
            wins: Some(8),
        };
        let entry = row.into_entry(EntityKind::Constructor);
        assert_eq!(entry.entity, EntityId::Constructor(ConstructorId(6)));
        assert_eq!(entry.points, Some(CumulativeStandingPoints(409.0)));
    }

    #[test]
    fn result_points_stay_per_race() {
        let row = ResultRow {
            race_id: 1,
            driver_id: 2,
            constructor_id: 3,
            grid: Some(0),
            position: None,
            points: Some(0.5),
            status_id: Some(11),
        };
        let result = RaceResult::from(row);
        assert_eq!(result.points, Some(RacePoints(0.5)));
        assert_eq!(result.grid, Some(0));
        assert_eq!(result.status_id, Some(StatusId(11)));
    }
}
