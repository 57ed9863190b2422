//! Win, podium, points and race counts per entity.
//!
//! One generic routine, [`tally_by`], folds race results under any
//! grouping key. The driver and constructor variants differ only in the
//! key they extract and in their secondary sort key.
//!
//! Points are scope dependent. Unscoped counts sum per-race points
//! ([`RacePoints`]). Season-scoped counts report the entity's total from
//! the season's latest standings snapshot ([`CumulativeStandingPoints`]),
//! since summing running totals across races would count every early race
//! many times over.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use pitwall_types::{
    CumulativeStandingPoints, EntityId, EntityKind, PointsTotal, RaceId, RacePoints, RaceResult,
};

use crate::dataset::{Dataset, DatasetSession, ResultFilter};
use crate::error::{DatasetError, StatsError};
use crate::params::{
    Limit, LimitQuery, ListQuery, Page, SeasonQuery, check_season, require_season,
};
use crate::resolver::{EntityRef, resolve_labels};
use crate::snapshot::resolve_snapshot;

/// Default page size for entity lists.
const DEFAULT_LIST_LIMIT: u32 = 50;

/// Default bound for the all-time driver wins table.
const DEFAULT_DRIVER_WINS_LIMIT: u32 = 10;

/// Default bound for the season constructor wins table.
const DEFAULT_CONSTRUCTOR_WINS_LIMIT: u32 = 20;

/// Running counts for one grouping key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    /// Distinct races entered.
    pub races: BTreeSet<RaceId>,
    /// Results classified first.
    pub wins: u32,
    /// Results classified first to third.
    pub podiums: u32,
    /// Sum of per-race points.
    pub points: RacePoints,
    /// Number of result rows folded in.
    pub entries: u32,
}

impl Tally {
    /// Fold one result into the tally.
    pub fn record(&mut self, result: &RaceResult) {
        self.races.insert(result.race_id);
        if result.is_win() {
            self.wins = self.wins.saturating_add(1);
        }
        if result.is_podium() {
            self.podiums = self.podiums.saturating_add(1);
        }
        self.points = self.points + result.points.unwrap_or(RacePoints::ZERO);
        self.entries = self.entries.saturating_add(1);
    }

    /// Number of distinct races entered.
    pub fn race_count(&self) -> u32 {
        u32::try_from(self.races.len()).unwrap_or(u32::MAX)
    }
}

/// Group results under `key` and tally each group.
pub fn tally_by<'a, K: Ord>(
    results: impl IntoIterator<Item = &'a RaceResult>,
    key: impl Fn(&RaceResult) -> K,
) -> BTreeMap<K, Tally> {
    let mut tallies: BTreeMap<K, Tally> = BTreeMap::new();
    for result in results {
        tallies.entry(key(result)).or_default().record(result);
    }
    tallies
}

/// The entity of `kind` a result is credited to.
pub const fn result_entity(kind: EntityKind, result: &RaceResult) -> EntityId {
    match kind {
        EntityKind::Driver => EntityId::Driver(result.driver_id),
        EntityKind::Constructor => EntityId::Constructor(result.constructor_id),
    }
}

/// Summary counts for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTotals {
    /// Entity and display name.
    #[serde(flatten)]
    pub entity: EntityRef,
    /// Nationality.
    pub nationality: Option<String>,
    /// Distinct races entered.
    pub races: u32,
    /// Wins.
    pub wins: u32,
    /// Podiums.
    pub podiums: u32,
    /// Season standing total or career race points, depending on scope.
    pub points: PointsTotal,
}

/// Ranking order: wins descending, then the kind's secondary key, then
/// identifier ascending.
fn rank(kind: EntityKind, a: &EntityTotals, b: &EntityTotals) -> Ordering {
    let secondary = match kind {
        EntityKind::Driver => b.podiums.cmp(&a.podiums),
        EntityKind::Constructor => b.points.total_cmp(&a.points),
    };
    b.wins
        .cmp(&a.wins)
        .then(secondary)
        .then_with(|| a.entity.id.cmp(&b.entity.id))
}

/// Ranked per-entity counts, all time or within one season.
///
/// Entities without a counted race in scope never appear.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is out of range and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn entity_totals(
    dataset: &dyn Dataset,
    kind: EntityKind,
    query: &ListQuery,
) -> Result<Vec<EntityTotals>, StatsError> {
    let season = check_season(query.season)?;
    let page = Page::new(query.limit, query.offset, DEFAULT_LIST_LIMIT);
    let mut session = dataset.session().await?;

    let results = session
        .results(&ResultFilter {
            year: season,
            ..ResultFilter::default()
        })
        .await?;
    let tallies = tally_by(&results, |r| result_entity(kind, r));

    let season_points: BTreeMap<EntityId, CumulativeStandingPoints> = match season {
        Some(season) => resolve_snapshot(session.as_mut(), kind, season, None)
            .await?
            .map(|snapshot| {
                snapshot
                    .entries
                    .into_iter()
                    .map(|e| (e.entity, e.points.unwrap_or_default()))
                    .collect()
            })
            .unwrap_or_default(),
        None => BTreeMap::new(),
    };

    let mut totals: Vec<EntityTotals> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.race_count() > 0)
        .map(|(id, tally)| EntityTotals {
            entity: EntityRef { id, name: None },
            nationality: None,
            races: tally.race_count(),
            wins: tally.wins,
            podiums: tally.podiums,
            points: match season {
                Some(_) => {
                    PointsTotal::Season(season_points.get(&id).copied().unwrap_or_default())
                }
                None => PointsTotal::Career(tally.points),
            },
        })
        .collect();
    totals.sort_by(|a, b| rank(kind, a, b));
    let mut totals = page.apply(totals);

    let labels = resolve_labels(session.as_mut(), totals.iter().map(|t| t.entity.id)).await?;
    for row in &mut totals {
        let label = labels.label(row.entity.id);
        row.entity.name = label.name;
        row.nationality = label.nationality;
    }

    tracing::debug!(
        ?kind,
        ?season,
        rows = totals.len(),
        "Computed entity totals"
    );
    Ok(totals)
}

/// Win count for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinCount {
    /// Entity and display name.
    #[serde(flatten)]
    pub entity: EntityRef,
    /// Number of wins in scope.
    pub wins: u32,
}

/// Rank winners in `filter`'s scope by win count, most wins first.
pub(crate) async fn win_counts(
    session: &mut dyn DatasetSession,
    kind: EntityKind,
    filter: ResultFilter,
    limit: Limit,
) -> Result<Vec<WinCount>, DatasetError> {
    let winners = session
        .results(&ResultFilter {
            position: Some(1),
            ..filter
        })
        .await?;
    let tallies = tally_by(&winners, |r| result_entity(kind, r));

    let mut ranked: Vec<(EntityId, u32)> = tallies
        .into_iter()
        .filter(|(_, t)| t.wins > 0)
        .map(|(id, t)| (id, t.wins))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit.as_len());

    let labels = resolve_labels(session, ranked.iter().map(|(id, _)| *id)).await?;
    Ok(ranked
        .into_iter()
        .map(|(id, wins)| WinCount {
            entity: labels.entity_ref(id),
            wins,
        })
        .collect())
}

/// All-time drivers ranked by race wins.
///
/// # Errors
///
/// Returns [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn top_driver_wins(
    dataset: &dyn Dataset,
    query: &LimitQuery,
) -> Result<Vec<WinCount>, StatsError> {
    let limit = Limit::clamped(query.limit, DEFAULT_DRIVER_WINS_LIMIT);
    let mut session = dataset.session().await?;
    let rows = win_counts(
        session.as_mut(),
        EntityKind::Driver,
        ResultFilter::default(),
        limit,
    )
    .await?;
    Ok(rows)
}

/// Constructors ranked by wins within one season.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn constructor_wins(
    dataset: &dyn Dataset,
    query: &SeasonQuery,
) -> Result<Vec<WinCount>, StatsError> {
    let season = require_season(query.season)?;
    let limit = Limit::clamped(query.limit, DEFAULT_CONSTRUCTOR_WINS_LIMIT);
    let mut session = dataset.session().await?;
    let rows = win_counts(
        session.as_mut(),
        EntityKind::Constructor,
        ResultFilter {
            year: Some(season),
            ..ResultFilter::default()
        },
        limit,
    )
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use pitwall_types::{ConstructorId, DriverId};

    use super::*;

    fn result(race: i32, driver: i32, team: i32, position: Option<i32>, points: f64) -> RaceResult {
        RaceResult {
            race_id: RaceId(race),
            driver_id: DriverId(driver),
            constructor_id: ConstructorId(team),
            grid: Some(1),
            position,
            points: Some(RacePoints(points)),
            status_id: None,
        }
    }

    #[test]
    fn tally_counts_distinct_races_wins_and_podiums() {
        let results = [
            result(1, 1, 10, Some(1), 25.0),
            result(2, 1, 10, Some(3), 15.0),
            result(3, 1, 10, None, 0.0),
            result(3, 2, 10, Some(2), 18.0),
        ];
        let tallies = tally_by(&results, |r| result_entity(EntityKind::Driver, r));
        let lead = &tallies[&EntityId::Driver(DriverId(1))];
        assert_eq!(lead.race_count(), 3);
        assert_eq!(lead.wins, 1);
        assert_eq!(lead.podiums, 2);
        assert!((lead.points.value() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn constructor_key_merges_team_mates() {
        let results = [
            result(1, 1, 10, Some(1), 25.0),
            result(1, 2, 10, Some(2), 18.0),
        ];
        let tallies = tally_by(&results, |r| result_entity(EntityKind::Constructor, r));
        let team = &tallies[&EntityId::Constructor(ConstructorId(10))];
        assert_eq!(team.race_count(), 1);
        assert_eq!(team.entries, 2);
        assert_eq!(team.podiums, 2);
    }

    #[test]
    fn drivers_rank_by_wins_then_podiums_then_id() {
        let make = |id: i32, wins: u32, podiums: u32| EntityTotals {
            entity: EntityRef {
                id: EntityId::Driver(DriverId(id)),
                name: None,
            },
            nationality: None,
            races: 1,
            wins,
            podiums,
            points: PointsTotal::Career(RacePoints::ZERO),
        };
        let mut rows = vec![make(3, 2, 5), make(1, 2, 5), make(2, 2, 7), make(4, 3, 3)];
        rows.sort_by(|a, b| rank(EntityKind::Driver, a, b));
        let ids: Vec<i32> = rows.iter().map(|r| r.entity.id.into_inner()).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn constructors_rank_by_wins_then_points() {
        let make = |id: i32, wins: u32, points: f64| EntityTotals {
            entity: EntityRef {
                id: EntityId::Constructor(ConstructorId(id)),
                name: None,
            },
            nationality: None,
            races: 1,
            wins,
            podiums: 0,
            points: PointsTotal::Season(CumulativeStandingPoints(points)),
        };
        let mut rows = vec![make(1, 1, 100.0), make(2, 1, 300.0), make(3, 0, 900.0)];
        rows.sort_by(|a, b| rank(EntityKind::Constructor, a, b));
        let ids: Vec<i32> = rows.iter().map(|r| r.entity.id.into_inner()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
