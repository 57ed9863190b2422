//! Round-by-round points progression for a season's leading entities.
//!
//! The cohort is the top N of the season's final standings snapshot. Each
//! member's series lists its standings entry after every race it has one
//! for; rounds before an entity first scored are absent rather than zero.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use pitwall_types::{
    CumulativeStandingPoints, EntityId, EntityKind, Race, RaceId, StandingsEntry,
};

use crate::dataset::{Dataset, RaceFilter, StandingsFilter};
use crate::error::StatsError;
use crate::params::{Limit, ProgressionQuery, require_season};
use crate::resolver::{EntityRef, resolve_labels};
use crate::snapshot::snapshot_from;

/// Default cohort size.
const DEFAULT_TOP_N: u32 = 5;

/// One point of an entity's series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionPoint {
    /// Round of the race.
    pub round: i32,
    /// Grand prix name.
    pub grand_prix: Option<String>,
    /// Entity and display name.
    #[serde(flatten)]
    pub entity: EntityRef,
    /// Running total after the race.
    pub points: Option<CumulativeStandingPoints>,
    /// Championship position after the race.
    pub position: Option<i32>,
}

/// Select the cohort and collect its series from already-scanned rows.
///
/// Returns `(race, entry)` pairs ordered by entity then round, with at
/// most one entry per entity and race.
pub fn progression_series<'a>(
    races: &'a [Race],
    standings: &[StandingsEntry],
    season: i32,
    top_n: Limit,
) -> Vec<(&'a Race, StandingsEntry)> {
    let Some(snapshot) = snapshot_from(races, standings, season, None) else {
        return Vec::new();
    };
    let cohort: BTreeSet<EntityId> = snapshot
        .entries
        .iter()
        .take(top_n.as_len())
        .map(|entry| entry.entity)
        .collect();
    let calendar: BTreeMap<RaceId, &Race> = races
        .iter()
        .filter(|race| race.year == season)
        .map(|race| (race.race_id, race))
        .collect();

    let mut series: BTreeMap<(EntityId, i32, RaceId), (&Race, StandingsEntry)> = BTreeMap::new();
    for entry in standings {
        if !cohort.contains(&entry.entity) {
            continue;
        }
        let Some(race) = calendar.get(&entry.race_id) else {
            continue;
        };
        series
            .entry((entry.entity, race.round, race.race_id))
            .or_insert_with(|| (*race, entry.clone()));
    }
    series.into_values().collect()
}

/// Points progression of the season's top `top_n` drivers or constructors.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn progression(
    dataset: &dyn Dataset,
    kind: EntityKind,
    query: &ProgressionQuery,
) -> Result<Vec<ProgressionPoint>, StatsError> {
    let season = require_season(query.season)?;
    let top_n = Limit::clamped(query.top_n, DEFAULT_TOP_N);

    let mut session = dataset.session().await?;
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

    let series = progression_series(&races, &standings, season, top_n);
    let ids: BTreeSet<EntityId> = series.iter().map(|(_, entry)| entry.entity).collect();
    let labels = resolve_labels(session.as_mut(), ids).await?;

    let rows: Vec<ProgressionPoint> = series
        .into_iter()
        .map(|(race, entry)| ProgressionPoint {
            round: race.round,
            grand_prix: race.name.clone(),
            entity: labels.entity_ref(entry.entity),
            points: entry.points,
            position: entry.position,
        })
        .collect();

    tracing::debug!(season, ?kind, rows = rows.len(), "Built points progression");
    Ok(rows)
}
