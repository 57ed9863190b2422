//! Standings snapshot resolution.
//!
//! A snapshot is the championship table as it stood immediately after one
//! race. The authoritative race for a season is the latest completed race
//! (one that has standings entries) at or before an optional round bound.
//!
//! "Latest" is decided by [`latest_race_id`], which takes the maximum
//! `RaceId`. That depends on the upstream scheme assigning race ids in
//! chronological order across seasons; [`RaceId`] documents the contract.
//!
//! Position ties are not broken: entries sharing a position keep the order
//! the dataset returned them in.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use pitwall_types::{
    CumulativeStandingPoints, EntityId, EntityKind, Race, RaceId, StandingsEntry,
};

use crate::dataset::{Dataset, DatasetSession, RaceFilter, StandingsFilter};
use crate::error::{DatasetError, StatsError};
use crate::params::{Limit, StandingsQuery, require_season};
use crate::resolver::{EntityRef, resolve_labels};

/// Default row bound for standings tables.
const DEFAULT_STANDINGS_LIMIT: u32 = 10;

/// One row of a resolved standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StandingRow {
    /// Entity and display name.
    #[serde(flatten)]
    pub entity: EntityRef,
    /// Running points total after the snapshot race.
    pub points: Option<CumulativeStandingPoints>,
    /// Championship position.
    pub position: Option<i32>,
}

/// A season's table after one race.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// The race the table applies to.
    pub race_id: RaceId,
    /// Entries ordered by position ascending, one per entity.
    pub entries: Vec<StandingsEntry>,
}

/// The race with the greatest id among `races` in `season`, optionally
/// restricted to rounds `<= round_bound`.
pub fn latest_race_id<'a>(
    races: impl IntoIterator<Item = &'a Race>,
    season: i32,
    round_bound: Option<i32>,
) -> Option<RaceId> {
    races
        .into_iter()
        .filter(|race| race.year == season)
        .filter(|race| round_bound.is_none_or(|bound| race.round <= bound))
        .map(|race| race.race_id)
        .max()
}

/// Order snapshot entries by position ascending.
///
/// Keeps the first entry seen for each entity. Unpositioned entries go last.
/// The sort is stable, so position ties preserve input order.
pub fn order_snapshot(entries: Vec<StandingsEntry>) -> Vec<StandingsEntry> {
    let mut seen = BTreeSet::new();
    let mut ordered: Vec<StandingsEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.entity))
        .collect();
    ordered.sort_by_key(|entry| (entry.position.is_none(), entry.position));
    ordered
}

/// Build the snapshot for `season` from already-scanned rows.
///
/// `races` and `standings` may contain rows from other seasons; they are
/// ignored. Returns `None` when the season has no completed race within
/// the bound.
pub fn snapshot_from(
    races: &[Race],
    standings: &[StandingsEntry],
    season: i32,
    round_bound: Option<i32>,
) -> Option<Snapshot> {
    let completed: BTreeSet<RaceId> = standings.iter().map(|entry| entry.race_id).collect();
    let race_id = latest_race_id(
        races.iter().filter(|race| completed.contains(&race.race_id)),
        season,
        round_bound,
    )?;
    let entries = standings
        .iter()
        .filter(|entry| entry.race_id == race_id)
        .cloned()
        .collect();
    Some(Snapshot {
        race_id,
        entries: order_snapshot(entries),
    })
}

/// Scan a season's races and standings and resolve its snapshot.
pub(crate) async fn resolve_snapshot(
    session: &mut dyn DatasetSession,
    kind: EntityKind,
    season: i32,
    round_bound: Option<i32>,
) -> Result<Option<Snapshot>, DatasetError> {
    let races = session
        .races(&RaceFilter {
            year: Some(season),
            ..RaceFilter::default()
        })
        .await?;
    let standings = session
        .standings(
            kind,
            &StandingsFilter {
                year: Some(season),
                ..StandingsFilter::default()
            },
        )
        .await?;
    Ok(snapshot_from(&races, &standings, season, round_bound))
}

/// For each season, the entry at the latest race in which the entity has
/// a standings entry. Ordered by year ascending.
///
/// Entries whose race is not in `races` are dropped.
pub fn latest_entry_per_season(
    entries: Vec<StandingsEntry>,
    races: &BTreeMap<RaceId, Race>,
) -> Vec<(i32, StandingsEntry)> {
    let mut latest: BTreeMap<i32, StandingsEntry> = BTreeMap::new();
    for entry in entries {
        let Some(race) = races.get(&entry.race_id) else {
            continue;
        };
        match latest.get(&race.year) {
            Some(current) if current.race_id >= entry.race_id => {}
            _ => {
                latest.insert(race.year, entry);
            }
        }
    }
    latest.into_iter().collect()
}

/// Resolve standings rows with display names for a snapshot.
pub(crate) async fn standing_rows(
    session: &mut dyn DatasetSession,
    entries: Vec<StandingsEntry>,
) -> Result<Vec<StandingRow>, DatasetError> {
    let ids: Vec<EntityId> = entries.iter().map(|entry| entry.entity).collect();
    let labels = resolve_labels(session, ids).await?;
    Ok(entries
        .into_iter()
        .map(|entry| StandingRow {
            entity: labels.entity_ref(entry.entity),
            points: entry.points,
            position: entry.position,
        })
        .collect())
}

/// The championship table for a season after its latest completed race
/// (bounded by `round` when given), leader first.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn standings_snapshot(
    dataset: &dyn Dataset,
    kind: EntityKind,
    query: &StandingsQuery,
) -> Result<Vec<StandingRow>, StatsError> {
    let season = require_season(query.season)?;
    let limit = Limit::clamped(query.limit, DEFAULT_STANDINGS_LIMIT);

    let mut session = dataset.session().await?;
    let Some(snapshot) = resolve_snapshot(session.as_mut(), kind, season, query.round).await?
    else {
        tracing::debug!(season, ?kind, "No completed race for standings snapshot");
        return Ok(Vec::new());
    };

    let entries: Vec<StandingsEntry> =
        snapshot.entries.into_iter().take(limit.as_len()).collect();
    let rows = standing_rows(session.as_mut(), entries).await?;

    tracing::debug!(
        season,
        ?kind,
        race_id = %snapshot.race_id,
        rows = rows.len(),
        "Resolved standings snapshot"
    );
    Ok(rows)
}
