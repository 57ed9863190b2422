//! End-to-end scenarios for the query operations over an in-memory
//! dataset, plus session-discipline checks against a dataset that fails.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pitwall_stats::dataset::{RaceFilter, ResultFilter, StandingsFilter, TimingFilter};
use pitwall_stats::{
    Dataset, DatasetError, DatasetSession, GridQuery, LapTimeQuery, ListQuery, MemoryData,
    MemoryDataset, PitStopQuery, ProgressionQuery, StandingsQuery, StatsError, driver_detail,
    entity_totals, grid_matrix, lap_time_stats, pit_stop_summary, progression,
    standings_snapshot,
};
use pitwall_types::{
    Circuit, CircuitId, Constructor, ConstructorId, CumulativeStandingPoints, Driver, DriverId,
    EntityId, EntityKind, LapTime, PitStop, PointsTotal, Race, RaceId, RacePoints, RaceResult,
    StandingsEntry, Status, StatusId,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

fn driver(id: i32, forename: &str, surname: &str) -> Driver {
    Driver {
        driver_id: DriverId(id),
        forename: Some(forename.to_owned()),
        surname: Some(surname.to_owned()),
        nationality: None,
        dob: None,
    }
}

fn result(race: i32, driver: i32, team: i32, grid: Option<i32>, position: Option<i32>) -> RaceResult {
    let points = match position {
        Some(1) => 25.0,
        Some(2) => 18.0,
        Some(3) => 15.0,
        _ => 0.0,
    };
    RaceResult {
        race_id: RaceId(race),
        driver_id: DriverId(driver),
        constructor_id: ConstructorId(team),
        grid,
        position,
        points: Some(RacePoints(points)),
        status_id: None,
    }
}

fn standing(race: i32, entity: EntityId, points: f64, position: i32) -> StandingsEntry {
    StandingsEntry {
        race_id: RaceId(race),
        entity,
        points: Some(CumulativeStandingPoints(points)),
        position: Some(position),
        wins: None,
    }
}

/// Season 2021, three rounds, three drivers in two teams.
///
/// Drivers 1 and 2 both win once; driver 2 has one more podium. Driver 3
/// wins round 3 but has fewer podiums than either.
fn season_2021() -> MemoryDataset {
    let d = |id| EntityId::Driver(DriverId(id));
    let races = (1..=3)
        .map(|round| Race {
            race_id: RaceId(1050 + round),
            year: 2021,
            round,
            name: Some(format!("Round {round} Grand Prix")),
            circuit_id: Some(CircuitId(1)),
        })
        .collect();
    MemoryDataset::new(MemoryData {
        races,
        drivers: vec![
            driver(1, "Max", "Verstappen"),
            driver(2, "Lewis", "Hamilton"),
            driver(3, "Sergio", "Perez"),
        ],
        constructors: vec![
            Constructor {
                constructor_id: ConstructorId(9),
                name: Some("Red Bull".into()),
                nationality: None,
            },
            Constructor {
                constructor_id: ConstructorId(131),
                name: Some("Mercedes".into()),
                nationality: None,
            },
        ],
        circuits: vec![Circuit {
            circuit_id: CircuitId(1),
            name: Some("Bahrain".into()),
            country: None,
            location: None,
        }],
        results: vec![
            result(1051, 1, 9, Some(1), Some(1)),
            result(1051, 2, 131, Some(2), Some(2)),
            result(1051, 3, 9, Some(5), None),
            result(1052, 2, 131, Some(1), Some(1)),
            result(1052, 1, 9, Some(3), Some(4)),
            result(1052, 3, 9, Some(2), Some(2)),
            result(1053, 3, 9, Some(0), Some(1)),
            result(1053, 2, 131, None, Some(3)),
            result(1053, 1, 9, Some(1), None),
        ],
        driver_standings: vec![
            standing(1051, d(1), 25.0, 1),
            standing(1051, d(2), 18.0, 2),
            standing(1052, d(2), 43.0, 1),
            standing(1052, d(1), 37.0, 2),
            standing(1052, d(3), 18.0, 3),
            standing(1053, d(2), 58.0, 1),
            standing(1053, d(3), 43.0, 2),
            standing(1053, d(1), 37.0, 3),
        ],
        pit_stops: vec![
            PitStop { race_id: RaceId(1051), driver_id: DriverId(1), stop: 1, lap: Some(14), milliseconds: Some(22_000) },
            PitStop { race_id: RaceId(1051), driver_id: DriverId(3), stop: 1, lap: Some(15), milliseconds: Some(24_000) },
            PitStop { race_id: RaceId(1051), driver_id: DriverId(3), stop: 2, lap: Some(40), milliseconds: None },
            PitStop { race_id: RaceId(1051), driver_id: DriverId(2), stop: 1, lap: Some(16), milliseconds: Some(21_000) },
            // No result row for driver 7: dropped from both groupings.
            PitStop { race_id: RaceId(1051), driver_id: DriverId(7), stop: 1, lap: Some(3), milliseconds: Some(30_000) },
        ],
        lap_times: vec![
            LapTime { race_id: RaceId(1051), driver_id: DriverId(1), lap: 1, position: Some(1), milliseconds: Some(92_000) },
            LapTime { race_id: RaceId(1051), driver_id: DriverId(1), lap: 2, position: Some(1), milliseconds: Some(90_000) },
            LapTime { race_id: RaceId(1051), driver_id: DriverId(2), lap: 1, position: Some(2), milliseconds: Some(93_000) },
            LapTime { race_id: RaceId(1051), driver_id: DriverId(2), lap: 2, position: Some(2), milliseconds: None },
        ],
        statuses: vec![Status { status_id: StatusId(1), status: Some("Finished".into()) }],
        ..MemoryData::default()
    })
}

// ---------------------------------------------------------------------------
// Aggregate counter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn season_leader_breaks_win_ties_by_podiums() {
    let rows = entity_totals(
        &season_2021(),
        EntityKind::Driver,
        &ListQuery { season: Some(2021), limit: Some(1), offset: None },
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].entity.id, EntityId::Driver(DriverId(2)));
    assert_eq!((rows[0].wins, rows[0].podiums), (1, 3));
    assert_eq!(
        rows[0].points,
        PointsTotal::Season(CumulativeStandingPoints(58.0))
    );
}

#[tokio::test]
async fn season_scoped_counts_never_include_zero_race_entities() {
    let rows = entity_totals(
        &season_2021(),
        EntityKind::Driver,
        &ListQuery { season: Some(2021), ..ListQuery::default() },
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|row| row.races > 0));

    let empty = entity_totals(
        &season_2021(),
        EntityKind::Driver,
        &ListQuery { season: Some(1950), ..ListQuery::default() },
    )
    .await
    .unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn career_points_sum_per_race_results() {
    let rows = entity_totals(&season_2021(), EntityKind::Constructor, &ListQuery::default())
        .await
        .unwrap();
    let red_bull = rows
        .iter()
        .find(|row| row.entity.id == EntityId::Constructor(ConstructorId(9)))
        .unwrap();
    assert_eq!(red_bull.points, PointsTotal::Career(RacePoints(68.0)));
    assert_eq!(red_bull.wins, 2);
}

// ---------------------------------------------------------------------------
// Snapshot, percentile, grid, progression
// ---------------------------------------------------------------------------

#[tokio::test]
async fn standings_are_strictly_ascending_without_duplicates() {
    let rows = standings_snapshot(
        &season_2021(),
        EntityKind::Driver,
        &StandingsQuery { season: Some(2021), ..StandingsQuery::default() },
    )
    .await
    .unwrap();
    let positions: Vec<i32> = rows.iter().filter_map(|row| row.position).collect();
    assert_eq!(positions, vec![1, 2, 3]);
    assert_eq!(rows[0].entity.name.as_deref(), Some("Lewis Hamilton"));
}

#[tokio::test]
async fn standings_respect_round_bound() {
    let rows = standings_snapshot(
        &season_2021(),
        EntityKind::Driver,
        &StandingsQuery { season: Some(2021), round: Some(1), limit: None },
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].entity.id, EntityId::Driver(DriverId(1)));
}

#[tokio::test]
async fn two_lap_race_interpolates_median_and_p95() {
    let rows = lap_time_stats(
        &season_2021(),
        &LapTimeQuery { race_id: Some(1051), ..LapTimeQuery::default() },
    )
    .await
    .unwrap();
    let max = rows
        .iter()
        .find(|row| row.entity.id == EntityId::Driver(DriverId(1)))
        .unwrap();
    assert!((max.p50_ms - 91_000.0).abs() < 1e-6);
    assert!((max.p95_ms - 91_900.0).abs() < 1e-6);
    assert_eq!((max.best_ms, max.worst_ms, max.laps), (90_000, 92_000, 2));

    // Fastest median first; the null lap is not counted.
    assert_eq!(rows[0].entity.id, EntityId::Driver(DriverId(1)));
    assert_eq!(rows[1].laps, 1);
}

#[tokio::test]
async fn pit_stops_group_by_constructor_through_results() {
    let rows = pit_stop_summary(
        &season_2021(),
        &PitStopQuery {
            season: Some(2021),
            group_by: Some(EntityKind::Constructor),
            ..PitStopQuery::default()
        },
    )
    .await
    .unwrap();
    let counts: Vec<(EntityId, u64)> = rows.iter().map(|r| (r.entity.id, r.pit_stops)).collect();
    assert_eq!(
        counts,
        vec![
            (EntityId::Constructor(ConstructorId(9)), 2),
            (EntityId::Constructor(ConstructorId(131)), 1),
        ]
    );
    assert!(rows.iter().all(|r| r.min_ms as f64 <= r.p50_ms && r.p95_ms <= r.max_ms as f64));
}

#[tokio::test]
async fn grid_counts_sum_to_fully_classified_results() {
    let cells = grid_matrix(&season_2021(), &GridQuery { season: Some(2021), race_id: None })
        .await
        .unwrap();
    let total: u64 = cells.iter().map(|c| c.count).sum();
    assert_eq!(total, 6);
    assert_eq!((cells[0].start_position, cells[0].finish_position), (0, 1));
}

#[tokio::test]
async fn progression_series_stay_within_season_rounds() {
    let rows = progression(
        &season_2021(),
        EntityKind::Driver,
        &ProgressionQuery { season: Some(2021), top_n: Some(2) },
    )
    .await
    .unwrap();
    assert!(rows.iter().all(|row| (1..=3).contains(&row.round)));
    let cohort: Vec<EntityId> = rows.iter().map(|row| row.entity.id).collect();
    assert!(!cohort.contains(&EntityId::Driver(DriverId(1))));
    // Driver 3 had not scored after round 1, so its series starts at round 2.
    let perez: Vec<i32> = rows
        .iter()
        .filter(|row| row.entity.id == EntityId::Driver(DriverId(3)))
        .map(|row| row.round)
        .collect();
    assert_eq!(perez, vec![2, 3]);
}

#[tokio::test]
async fn unknown_driver_detail_is_empty_not_an_error() {
    let detail = driver_detail(&season_2021(), DriverId(99_999)).await.unwrap();
    assert_eq!(detail.info, None);
    assert!(detail.history.is_empty());
    assert!(detail.seasons.is_empty());
}

// ---------------------------------------------------------------------------
// Session discipline
// ---------------------------------------------------------------------------

/// A dataset whose scans all fail and which tracks open sessions.
#[derive(Default)]
struct FailingDataset {
    opened: Arc<AtomicUsize>,
    open: Arc<AtomicUsize>,
}

struct FailingSession {
    open: Arc<AtomicUsize>,
}

impl Drop for FailingSession {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Dataset for FailingDataset {
    async fn session(&self) -> Result<Box<dyn DatasetSession>, DatasetError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FailingSession {
            open: Arc::clone(&self.open),
        }))
    }
}

#[async_trait]
impl DatasetSession for FailingSession {
    async fn seasons(&mut self) -> Result<Vec<i32>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn races(&mut self, _: &RaceFilter) -> Result<Vec<Race>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn results(&mut self, _: &ResultFilter) -> Result<Vec<RaceResult>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn standings(
        &mut self,
        _: EntityKind,
        _: &StandingsFilter,
    ) -> Result<Vec<StandingsEntry>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn pit_stops(&mut self, _: &TimingFilter) -> Result<Vec<PitStop>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn lap_times(&mut self, _: &TimingFilter) -> Result<Vec<LapTime>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn drivers(&mut self, _: Option<&[DriverId]>) -> Result<Vec<Driver>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn constructors(
        &mut self,
        _: Option<&[ConstructorId]>,
    ) -> Result<Vec<Constructor>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn circuits(&mut self, _: Option<&[CircuitId]>) -> Result<Vec<Circuit>, DatasetError> {
        Err(DatasetError::Unavailable)
    }

    async fn statuses(&mut self) -> Result<Vec<Status>, DatasetError> {
        Err(DatasetError::Unavailable)
    }
}

#[tokio::test]
async fn scan_failure_is_unavailable_and_releases_the_session() {
    let dataset = FailingDataset::default();
    let err = grid_matrix(&dataset, &GridQuery { season: Some(2021), race_id: None }).await;
    assert_eq!(err, Err(StatsError::DatasetUnavailable));
    let err = driver_detail(&dataset, DriverId(1)).await;
    assert_eq!(err, Err(StatsError::DatasetUnavailable));
    assert_eq!(dataset.opened.load(Ordering::SeqCst), 2);
    assert_eq!(dataset.open.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn validation_fails_before_touching_the_dataset() {
    let dataset = FailingDataset::default();
    let err = pit_stop_summary(&dataset, &PitStopQuery::default()).await;
    assert_eq!(err, Err(StatsError::Validation("season is required".into())));
    let err = lap_time_stats(&dataset, &LapTimeQuery::default()).await;
    assert_eq!(err, Err(StatsError::Validation("race_id is required".into())));
    assert_eq!(dataset.opened.load(Ordering::SeqCst), 0);
}
