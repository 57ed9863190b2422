//! Entity records of the historical results dataset.
//!
//! All records are owned by the external dataset and read-only from the
//! engine's perspective. Nullable columns stay `Option` all the way through:
//! a missing finishing position means "not classified", never zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{CircuitId, ConstructorId, DriverId, RaceId, StatusId};
use crate::points::{CumulativeStandingPoints, RacePoints};

/// One round of one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Race {
    /// Race identifier (monotonic with chronological order).
    pub race_id: RaceId,
    /// Season year.
    pub year: i32,
    /// 1-based round number, unique within `year`.
    pub round: i32,
    /// Grand prix name.
    pub name: Option<String>,
    /// Circuit the race was held at.
    pub circuit_id: Option<CircuitId>,
}

/// A driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Driver {
    /// Driver identifier.
    pub driver_id: DriverId,
    /// Given name.
    pub forename: Option<String>,
    /// Family name.
    pub surname: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
    /// Date of birth.
    pub dob: Option<NaiveDate>,
}

impl Driver {
    /// Display name: `forename + " " + surname`.
    ///
    /// Absent when either part is absent; the parts are never replaced with
    /// placeholders.
    pub fn display_name(&self) -> Option<String> {
        display_name(self.forename.as_deref(), self.surname.as_deref())
    }
}

/// Join a forename and surname with a single space.
///
/// Returns `None` when either part is missing.
pub fn display_name(forename: Option<&str>, surname: Option<&str>) -> Option<String> {
    match (forename, surname) {
        (Some(first), Some(last)) => Some(format!("{first} {last}")),
        _ => None,
    }
}

/// A constructor (team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Constructor {
    /// Constructor identifier.
    pub constructor_id: ConstructorId,
    /// Team name.
    pub name: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
}

/// A circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Circuit {
    /// Circuit identifier.
    pub circuit_id: CircuitId,
    /// Circuit name.
    pub name: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Town or city.
    pub location: Option<String>,
}

/// One driver's entry in one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RaceResult {
    /// Race the result belongs to.
    pub race_id: RaceId,
    /// Driver who entered.
    pub driver_id: DriverId,
    /// Constructor the driver entered for.
    pub constructor_id: ConstructorId,
    /// Starting position; absent if the entrant did not start.
    pub grid: Option<i32>,
    /// Classified finishing position; absent if not classified.
    pub position: Option<i32>,
    /// Points scored in this race.
    pub points: Option<RacePoints>,
    /// Finish or retirement reason.
    pub status_id: Option<StatusId>,
}

impl RaceResult {
    /// Whether this result is a race win.
    pub fn is_win(&self) -> bool {
        self.position == Some(1)
    }

    /// Whether this result is a podium (classified 1st to 3rd).
    pub fn is_podium(&self) -> bool {
        matches!(self.position, Some(1..=3))
    }
}

/// Which entity kind a standings table or grouped statistic is keyed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum EntityKind {
    /// Drivers.
    #[default]
    Driver,
    /// Constructors.
    Constructor,
}

/// Identifier of either entity kind.
///
/// Serializes as `{"driverId": n}` or `{"constructorId": n}`, so it can be
/// flattened into output rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityId {
    /// A driver.
    #[serde(rename = "driverId")]
    Driver(DriverId),
    /// A constructor.
    #[serde(rename = "constructorId")]
    Constructor(ConstructorId),
}

impl EntityId {
    /// The kind of entity this identifier refers to.
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Driver(_) => EntityKind::Driver,
            Self::Constructor(_) => EntityKind::Constructor,
        }
    }

    /// The inner integer key.
    pub const fn into_inner(self) -> i32 {
        match self {
            Self::Driver(id) => id.into_inner(),
            Self::Constructor(id) => id.into_inner(),
        }
    }
}

/// Championship standing of one entity immediately after one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingsEntry {
    /// Race after which the standing applies.
    pub race_id: RaceId,
    /// Driver or constructor the standing belongs to.
    pub entity: EntityId,
    /// Running points total.
    pub points: Option<CumulativeStandingPoints>,
    /// Championship position (1 = leader).
    pub position: Option<i32>,
    /// Running win count.
    pub wins: Option<i32>,
}

/// One pit stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PitStop {
    /// Race of the stop.
    pub race_id: RaceId,
    /// Driver who stopped.
    pub driver_id: DriverId,
    /// Stop number within the race.
    pub stop: i32,
    /// Lap the stop was made on.
    pub lap: Option<i32>,
    /// Stop duration in milliseconds.
    pub milliseconds: Option<i32>,
}

/// One completed (or attempted) lap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LapTime {
    /// Race of the lap.
    pub race_id: RaceId,
    /// Driver who drove the lap.
    pub driver_id: DriverId,
    /// Lap number.
    pub lap: i32,
    /// Running position at the end of the lap.
    pub position: Option<i32>,
    /// Lap time in milliseconds; absent for laps not completed.
    pub milliseconds: Option<i32>,
}

/// Finish/retirement reason lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Status {
    /// Status identifier.
    pub status_id: StatusId,
    /// Label such as `Finished` or `Engine`.
    pub status: Option<String>,
}
