//! Catalog queries: seasons, circuits, finishing statuses and per-season
//! winners.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use pitwall_types::{CircuitId, EntityId, EntityKind, RaceId, RacePoints, StatusId};

use crate::dataset::{Dataset, DatasetSession, RaceFilter, ResultFilter};
use crate::error::{DatasetError, StatsError};
use crate::params::{Page, PageQuery, SeasonOnlyQuery, require_season};
use crate::resolver::resolve_labels;
use crate::snapshot::{StandingRow, resolve_snapshot, standing_rows};

/// Default page size for the circuit list.
const DEFAULT_CIRCUIT_LIMIT: u32 = 50;

/// A season with at least one race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Season {
    /// Season year.
    pub year: i32,
}

/// Every season with a race, newest first.
///
/// # Errors
///
/// Returns [`StatsError::DatasetUnavailable`] when the scan fails.
pub async fn list_seasons(dataset: &dyn Dataset) -> Result<Vec<Season>, StatsError> {
    let mut session = dataset.session().await?;
    let years: BTreeSet<i32> = session.seasons().await?.into_iter().collect();
    Ok(years.into_iter().rev().map(|year| Season { year }).collect())
}

/// How many results ended with a given status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    /// Status text.
    pub status: Option<String>,
    /// Results with that status.
    pub count: u64,
}

/// Finishing status frequencies for a season, most common first.
///
/// Results without a known status are not counted.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn status_distribution(
    dataset: &dyn Dataset,
    query: &SeasonOnlyQuery,
) -> Result<Vec<StatusCount>, StatsError> {
    let season = require_season(query.season)?;
    let mut session = dataset.session().await?;
    let results = session
        .results(&ResultFilter {
            year: Some(season),
            ..ResultFilter::default()
        })
        .await?;
    let statuses: BTreeMap<StatusId, Option<String>> = session
        .statuses()
        .await?
        .into_iter()
        .map(|s| (s.status_id, s.status))
        .collect();

    let mut counts: BTreeMap<Option<String>, u64> = BTreeMap::new();
    for status_id in results.iter().filter_map(|r| r.status_id) {
        if let Some(text) = statuses.get(&status_id) {
            let count = counts.entry(text.clone()).or_default();
            *count = count.saturating_add(1);
        }
    }

    let mut rows: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));

    tracing::debug!(season, rows = rows.len(), "Computed status distribution");
    Ok(rows)
}

/// A circuit with the number of races it has hosted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitSummary {
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
}

/// Count races per circuit.
pub(crate) async fn races_per_circuit(
    session: &mut dyn DatasetSession,
    circuit_id: Option<CircuitId>,
) -> Result<BTreeMap<CircuitId, Vec<i32>>, DatasetError> {
    let races = session
        .races(&RaceFilter {
            circuit_id,
            ..RaceFilter::default()
        })
        .await?;
    let mut years: BTreeMap<CircuitId, Vec<i32>> = BTreeMap::new();
    for race in races {
        if let Some(circuit) = race.circuit_id {
            years.entry(circuit).or_default().push(race.year);
        }
    }
    Ok(years)
}

/// Circuits by name, including those that never hosted a race.
///
/// # Errors
///
/// Returns [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn list_circuits(
    dataset: &dyn Dataset,
    query: &PageQuery,
) -> Result<Vec<CircuitSummary>, StatsError> {
    let page = Page::new(query.limit, query.offset, DEFAULT_CIRCUIT_LIMIT);
    let mut session = dataset.session().await?;
    let hosted = races_per_circuit(session.as_mut(), None).await?;
    let mut circuits = session.circuits(None).await?;
    circuits.sort_by(|a, b| {
        (a.name.is_none(), &a.name, a.circuit_id).cmp(&(b.name.is_none(), &b.name, b.circuit_id))
    });

    let rows = page
        .apply(circuits)
        .into_iter()
        .map(|c| CircuitSummary {
            total_races: hosted
                .get(&c.circuit_id)
                .map_or(0, |years| u64::try_from(years.len()).unwrap_or(u64::MAX)),
            circuit_id: c.circuit_id,
            name: c.name,
            country: c.country,
            location: c.location,
        })
        .collect();
    Ok(rows)
}

/// The winner of one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceWinner {
    /// Race identifier.
    #[serde(rename = "raceId")]
    pub race_id: RaceId,
    /// Round within the season.
    pub round: i32,
    /// Grand prix name.
    pub grand_prix: Option<String>,
    /// Winning driver's display name.
    pub winner: Option<String>,
    /// Winning constructor's name.
    pub constructor: Option<String>,
    /// Points scored for the win.
    pub points: Option<RacePoints>,
}

/// Race winners and champions of one season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonWinners {
    /// One row per winning result, by round.
    pub races: Vec<RaceWinner>,
    /// Leader of the final drivers' table.
    pub driver_champion: Option<StandingRow>,
    /// Leader of the final constructors' table.
    pub constructor_champion: Option<StandingRow>,
}

async fn champion(
    session: &mut dyn DatasetSession,
    kind: EntityKind,
    year: i32,
) -> Result<Option<StandingRow>, DatasetError> {
    let Some(snapshot) = resolve_snapshot(session, kind, year, None).await? else {
        return Ok(None);
    };
    let leaders = snapshot
        .entries
        .into_iter()
        .filter(|entry| entry.position == Some(1))
        .take(1)
        .collect();
    Ok(standing_rows(session, leaders).await?.into_iter().next())
}

/// Per-round winners of `year` plus both champions.
///
/// A season with no data yields empty races and no champions.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `year` is out of range and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn season_winners(dataset: &dyn Dataset, year: i32) -> Result<SeasonWinners, StatsError> {
    let year = require_season(Some(year))?;
    let mut session = dataset.session().await?;
    let calendar: BTreeMap<RaceId, _> = session
        .races(&RaceFilter {
            year: Some(year),
            ..RaceFilter::default()
        })
        .await?
        .into_iter()
        .map(|race| (race.race_id, race))
        .collect();
    let mut winners = session
        .results(&ResultFilter {
            year: Some(year),
            position: Some(1),
            ..ResultFilter::default()
        })
        .await?;
    winners.retain(|r| calendar.contains_key(&r.race_id));

    let ids = winners.iter().flat_map(|r| {
        [
            EntityId::Driver(r.driver_id),
            EntityId::Constructor(r.constructor_id),
        ]
    });
    let labels = resolve_labels(session.as_mut(), ids.collect::<Vec<_>>()).await?;

    let mut races: Vec<RaceWinner> = winners
        .into_iter()
        .filter_map(|result| {
            let race = calendar.get(&result.race_id)?;
            Some(RaceWinner {
                race_id: race.race_id,
                round: race.round,
                grand_prix: race.name.clone(),
                winner: labels.label(EntityId::Driver(result.driver_id)).name,
                constructor: labels.label(EntityId::Constructor(result.constructor_id)).name,
                points: result.points,
            })
        })
        .collect();
    races.sort_by_key(|row| (row.round, row.race_id));

    let driver_champion = champion(session.as_mut(), EntityKind::Driver, year).await?;
    let constructor_champion = champion(session.as_mut(), EntityKind::Constructor, year).await?;

    tracing::debug!(year, races = races.len(), "Resolved season winners");
    Ok(SeasonWinners {
        races,
        driver_champion,
        constructor_champion,
    })
}
