//! Single-entity detail views.
//!
//! An identifier that matches no record is not an error: the detail comes
//! back with `info: null` and empty lists.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use pitwall_types::{
    CircuitId, ConstructorId, CumulativeStandingPoints, DriverId, EntityId, EntityKind, Race,
    RaceId, RacePoints,
};

use crate::catalog::races_per_circuit;
use crate::counter::{Tally, WinCount, win_counts};
use crate::dataset::{Dataset, RaceFilter, ResultFilter, StandingsFilter};
use crate::error::StatsError;
use crate::params::Limit;
use crate::resolver::resolve_circuits;
use crate::snapshot::latest_entry_per_season;

/// Length of each winners list on a circuit page.
const CIRCUIT_TOP_WINNERS: u32 = 15;

/// Career summary of a driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverInfo {
    /// Driver identifier.
    #[serde(rename = "driverId")]
    pub driver_id: DriverId,
    /// Given name.
    pub forename: Option<String>,
    /// Family name.
    pub surname: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
    /// Date of birth.
    pub dob: Option<NaiveDate>,
    /// Distinct races entered.
    pub races: u32,
    /// Race wins.
    pub wins: u32,
    /// Podium finishes.
    pub podiums: u32,
    /// Career points, summed per race.
    pub points: RacePoints,
}

/// One race in a driver's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceEntry {
    /// Season.
    pub year: i32,
    /// Round.
    pub round: i32,
    /// Grand prix name.
    pub grand_prix: Option<String>,
    /// Points scored.
    pub points: Option<RacePoints>,
    /// Finishing position.
    pub position: Option<i32>,
}

/// An entity's championship standing at the end of its season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonStanding {
    /// Season.
    pub year: i32,
    /// Running total at the entity's last standings entry of the season.
    pub points: Option<CumulativeStandingPoints>,
    /// Championship position at that entry.
    pub position: Option<i32>,
    /// Wins recorded at that entry.
    pub wins: Option<i32>,
}

/// Everything the driver page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverDetail {
    /// Career summary, `None` for an unknown driver.
    pub info: Option<DriverInfo>,
    /// Every result, by year then round.
    pub history: Vec<RaceEntry>,
    /// End-of-season standings, by year.
    pub seasons: Vec<SeasonStanding>,
}

impl DriverDetail {
    const fn empty() -> Self {
        Self {
            info: None,
            history: Vec::new(),
            seasons: Vec::new(),
        }
    }
}

/// Detail view for one driver.
///
/// # Errors
///
/// Returns [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn driver_detail(
    dataset: &dyn Dataset,
    driver_id: DriverId,
) -> Result<DriverDetail, StatsError> {
    let mut session = dataset.session().await?;
    let Some(driver) = session.drivers(Some(&[driver_id])).await?.into_iter().next() else {
        tracing::debug!(%driver_id, "Unknown driver");
        return Ok(DriverDetail::empty());
    };

    let results = session
        .results(&ResultFilter {
            driver_id: Some(driver_id),
            ..ResultFilter::default()
        })
        .await?;
    let calendar: BTreeMap<RaceId, Race> = session
        .races(&RaceFilter::default())
        .await?
        .into_iter()
        .map(|race| (race.race_id, race))
        .collect();
    let standings = session
        .standings(
            EntityKind::Driver,
            &StandingsFilter {
                entity: Some(EntityId::Driver(driver_id)),
                ..StandingsFilter::default()
            },
        )
        .await?;

    let mut tally = Tally::default();
    for result in &results {
        tally.record(result);
    }

    let mut history: Vec<RaceEntry> = results
        .iter()
        .filter_map(|result| {
            let race = calendar.get(&result.race_id)?;
            Some(RaceEntry {
                year: race.year,
                round: race.round,
                grand_prix: race.name.clone(),
                points: result.points,
                position: result.position,
            })
        })
        .collect();
    history.sort_by_key(|entry| (entry.year, entry.round));

    let seasons = latest_entry_per_season(standings, &calendar)
        .into_iter()
        .map(|(year, entry)| SeasonStanding {
            year,
            points: entry.points,
            position: entry.position,
            wins: entry.wins,
        })
        .collect();

    Ok(DriverDetail {
        info: Some(DriverInfo {
            driver_id,
            forename: driver.forename,
            surname: driver.surname,
            nationality: driver.nationality,
            dob: driver.dob,
            races: tally.race_count(),
            wins: tally.wins,
            podiums: tally.podiums,
            points: tally.points,
        }),
        history,
        seasons,
    })
}

/// Career summary of a constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorInfo {
    /// Constructor identifier.
    #[serde(rename = "constructorId")]
    pub constructor_id: ConstructorId,
    /// Team name.
    pub name: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
    /// Distinct races entered.
    pub races: u32,
    /// Race wins.
    pub wins: u32,
    /// Podium finishes.
    pub podiums: u32,
    /// Career points, summed per race.
    pub points: RacePoints,
}

/// A constructor's record in one season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConstructorYear {
    /// Season.
    pub year: i32,
    /// Race wins.
    pub wins: u32,
    /// Result rows (one per car entered).
    pub races: u32,
}

/// Everything the constructor page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructorDetail {
    /// Career summary, `None` for an unknown constructor.
    pub info: Option<ConstructorInfo>,
    /// Per-season record, by year.
    pub years: Vec<ConstructorYear>,
}

/// Detail view for one constructor.
///
/// # Errors
///
/// Returns [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn constructor_detail(
    dataset: &dyn Dataset,
    constructor_id: ConstructorId,
) -> Result<ConstructorDetail, StatsError> {
    let mut session = dataset.session().await?;
    let Some(constructor) = session
        .constructors(Some(&[constructor_id]))
        .await?
        .into_iter()
        .next()
    else {
        tracing::debug!(%constructor_id, "Unknown constructor");
        return Ok(ConstructorDetail {
            info: None,
            years: Vec::new(),
        });
    };

    let results = session
        .results(&ResultFilter {
            constructor_id: Some(constructor_id),
            ..ResultFilter::default()
        })
        .await?;
    let years_by_race: BTreeMap<RaceId, i32> = session
        .races(&RaceFilter::default())
        .await?
        .into_iter()
        .map(|race| (race.race_id, race.year))
        .collect();

    let mut career = Tally::default();
    let mut seasons: BTreeMap<i32, Tally> = BTreeMap::new();
    for result in &results {
        career.record(result);
        if let Some(year) = years_by_race.get(&result.race_id) {
            seasons.entry(*year).or_default().record(result);
        }
    }

    let years = seasons
        .into_iter()
        .map(|(year, tally)| ConstructorYear {
            year,
            wins: tally.wins,
            races: tally.entries,
        })
        .collect();

    Ok(ConstructorDetail {
        info: Some(ConstructorInfo {
            constructor_id,
            name: constructor.name,
            nationality: constructor.nationality,
            races: career.race_count(),
            wins: career.wins,
            podiums: career.podiums,
            points: career.points,
        }),
        years,
    })
}

/// Summary of a circuit's hosting record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitInfo {
    /// Circuit identifier.
    #[serde(rename = "circuitId")]
    pub circuit_id: CircuitId,
    /// Circuit name.
    pub name: Option<String>,
    /// Country.
    pub country: Option<String>,
    /// Town or city.
    pub location: Option<String>,
    /// Races held there.
    pub total_races: u64,
    /// First season it hosted a race.
    pub first_year: Option<i32>,
    /// Most recent season it hosted a race.
    pub last_year: Option<i32>,
}

/// Everything the circuit page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitDetail {
    /// Hosting summary, `None` for an unknown circuit.
    pub info: Option<CircuitInfo>,
    /// Drivers with the most wins there.
    pub top_drivers: Vec<WinCount>,
    /// Constructors with the most wins there.
    pub top_constructors: Vec<WinCount>,
}

/// Detail view for one circuit.
///
/// # Errors
///
/// Returns [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn circuit_detail(
    dataset: &dyn Dataset,
    circuit_id: CircuitId,
) -> Result<CircuitDetail, StatsError> {
    let mut session = dataset.session().await?;
    let mut circuits =
        resolve_circuits(session.as_mut(), &BTreeSet::from([circuit_id])).await?;
    let Some(circuit) = circuits.remove(&circuit_id) else {
        tracing::debug!(%circuit_id, "Unknown circuit");
        return Ok(CircuitDetail {
            info: None,
            top_drivers: Vec::new(),
            top_constructors: Vec::new(),
        });
    };

    let years = races_per_circuit(session.as_mut(), Some(circuit_id))
        .await?
        .remove(&circuit_id)
        .unwrap_or_default();
    let at_circuit = ResultFilter {
        circuit_id: Some(circuit_id),
        ..ResultFilter::default()
    };
    let top = Limit::clamped(None, CIRCUIT_TOP_WINNERS);
    let top_drivers = win_counts(session.as_mut(), EntityKind::Driver, at_circuit, top).await?;
    let top_constructors =
        win_counts(session.as_mut(), EntityKind::Constructor, at_circuit, top).await?;

    Ok(CircuitDetail {
        info: Some(CircuitInfo {
            circuit_id,
            name: circuit.name,
            country: circuit.country,
            location: circuit.location,
            total_races: u64::try_from(years.len()).unwrap_or(u64::MAX),
            first_year: years.iter().copied().min(),
            last_year: years.iter().copied().max(),
        }),
        top_drivers,
        top_constructors,
    })
}
