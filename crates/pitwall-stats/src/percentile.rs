//! Distribution summaries over millisecond durations.
//!
//! Lap times and pit-stop durations are grouped by entity and reduced to
//! count, min, max, mean, median and p95. Null durations are dropped
//! before anything is counted: they neither count as zero nor shift a
//! percentile rank. A group with no non-null sample is omitted.
//!
//! Percentiles use continuous linear interpolation over the sorted
//! sample, matching `PERCENTILE_CONT`:
//!
//! ```text
//! r = p * (n - 1)
//! value = v[floor(r)] + (r - floor(r)) * (v[ceil(r)] - v[floor(r)])
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use pitwall_types::{DriverId, EntityId, EntityKind, RaceId};

use crate::dataset::{Dataset, ResultFilter, TimingFilter};
use crate::error::StatsError;
use crate::params::{LapTimeQuery, Limit, PitStopQuery, require, require_season};
use crate::resolver::{EntityRef, resolve_labels};

/// Default row bound for lap-time statistics.
const DEFAULT_LAP_TIME_TOP_N: u32 = 10;

/// Default row bound for pit-stop summaries.
const DEFAULT_PIT_STOP_LIMIT: u32 = 30;

/// Continuous percentile of an ascending-sorted sample.
///
/// `p` is clamped to `[0, 1]`. Returns `None` for an empty sample.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn percentile_cont(sorted: &[i64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = p.clamp(0.0, 1.0) * last as f64;
    let floor = rank.floor();
    let lower = *sorted.get(floor as usize)?;
    let upper = *sorted.get(rank.ceil() as usize)?;
    Some(lower as f64 + (rank - floor) * upper.saturating_sub(lower) as f64)
}

/// Summary statistics of one group's non-null samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationSummary {
    /// Number of non-null observations.
    pub count: u64,
    /// Smallest observation.
    pub min: i64,
    /// Largest observation.
    pub max: i64,
    /// Arithmetic mean.
    pub mean: f64,
    /// 50th percentile.
    pub median: f64,
    /// 95th percentile.
    pub p95: f64,
}

impl DurationSummary {
    /// Summarize a sample in any order. Returns `None` when it is empty.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_samples(mut samples: Vec<i64>) -> Option<Self> {
        samples.sort_unstable();
        let min = *samples.first()?;
        let max = *samples.last()?;
        let count = u64::try_from(samples.len()).ok()?;
        let sum: i128 = samples.iter().map(|&v| i128::from(v)).sum();
        Some(Self {
            count,
            min,
            max,
            mean: sum as f64 / count as f64,
            median: percentile_cont(&samples, 0.5)?,
            p95: percentile_cont(&samples, 0.95)?,
        })
    }
}

/// Group rows under `key`, keep non-null `value`s, and summarize each group.
///
/// Rows whose key is `None` are dropped along with null values.
pub fn summarize_by<T, K: Ord>(
    rows: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> Option<K>,
    value: impl Fn(&T) -> Option<i64>,
) -> BTreeMap<K, DurationSummary> {
    let mut samples: BTreeMap<K, Vec<i64>> = BTreeMap::new();
    for row in rows {
        if let (Some(k), Some(v)) = (key(&row), value(&row)) {
            samples.entry(k).or_default().push(v);
        }
    }
    samples
        .into_iter()
        .filter_map(|(k, s)| DurationSummary::from_samples(s).map(|summary| (k, summary)))
        .collect()
}

/// Lap-time distribution for one driver in one race.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapTimeStats {
    /// Driver and display name.
    #[serde(flatten)]
    pub entity: EntityRef,
    /// Median lap time.
    pub p50_ms: f64,
    /// 95th percentile lap time.
    pub p95_ms: f64,
    /// Mean lap time.
    pub mean_ms: f64,
    /// Fastest lap.
    pub best_ms: i64,
    /// Slowest lap.
    pub worst_ms: i64,
    /// Laps with a recorded time.
    pub laps: u64,
}

/// Per-driver lap-time statistics for one race, fastest median first.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `race_id` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn lap_time_stats(
    dataset: &dyn Dataset,
    query: &LapTimeQuery,
) -> Result<Vec<LapTimeStats>, StatsError> {
    let race_id = RaceId(require("race_id", query.race_id)?);
    let top_n = Limit::clamped(query.top_n, DEFAULT_LAP_TIME_TOP_N);

    let mut session = dataset.session().await?;
    let laps = session
        .lap_times(&TimingFilter {
            race_id: Some(race_id),
            driver_id: query.driver_id.map(DriverId),
            ..TimingFilter::default()
        })
        .await?;

    let summaries = summarize_by(
        &laps,
        |lap| Some(EntityId::Driver(lap.driver_id)),
        |lap| lap.milliseconds.map(i64::from),
    );
    let mut ranked: Vec<(EntityId, DurationSummary)> = summaries.into_iter().collect();
    ranked.sort_by(|a, b| a.1.median.total_cmp(&b.1.median).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(top_n.as_len());

    let labels = resolve_labels(session.as_mut(), ranked.iter().map(|(id, _)| *id)).await?;
    let rows: Vec<LapTimeStats> = ranked
        .into_iter()
        .map(|(id, s)| LapTimeStats {
            entity: labels.entity_ref(id),
            p50_ms: s.median,
            p95_ms: s.p95,
            mean_ms: s.mean,
            best_ms: s.min,
            worst_ms: s.max,
            laps: s.count,
        })
        .collect();

    tracing::debug!(%race_id, rows = rows.len(), "Computed lap time stats");
    Ok(rows)
}

/// Pit-stop duration distribution for one driver or constructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitStopSummary {
    /// Driver or constructor and display name.
    #[serde(flatten)]
    pub entity: EntityRef,
    /// Stops with a recorded duration.
    pub pit_stops: u64,
    /// Mean duration.
    pub avg_ms: f64,
    /// Median duration.
    pub p50_ms: f64,
    /// 95th percentile duration.
    pub p95_ms: f64,
    /// Shortest stop.
    pub min_ms: i64,
    /// Longest stop.
    pub max_ms: i64,
}

/// Pit-stop summaries for a season (or one race of it), grouped by driver
/// or constructor, most stops first.
///
/// A stop is credited to the constructor of the driver's result in that
/// race; stops without a matching result are not counted under either
/// grouping.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn pit_stop_summary(
    dataset: &dyn Dataset,
    query: &PitStopQuery,
) -> Result<Vec<PitStopSummary>, StatsError> {
    let season = require_season(query.season)?;
    let group_by = query.group_by.unwrap_or_default();
    let limit = Limit::clamped(query.limit, DEFAULT_PIT_STOP_LIMIT);
    let race_id = query.race_id.map(RaceId);

    let mut session = dataset.session().await?;
    let stops = session
        .pit_stops(&TimingFilter {
            year: Some(season),
            race_id,
            ..TimingFilter::default()
        })
        .await?;
    let results = session
        .results(&ResultFilter {
            year: Some(season),
            race_id,
            ..ResultFilter::default()
        })
        .await?;

    let mut entrants = BTreeMap::new();
    for result in &results {
        entrants
            .entry((result.race_id, result.driver_id))
            .or_insert(result.constructor_id);
    }

    let summaries = summarize_by(
        &stops,
        |stop| {
            let constructor = entrants.get(&(stop.race_id, stop.driver_id))?;
            Some(match group_by {
                EntityKind::Driver => EntityId::Driver(stop.driver_id),
                EntityKind::Constructor => EntityId::Constructor(*constructor),
            })
        },
        |stop| stop.milliseconds.map(i64::from),
    );
    let mut ranked: Vec<(EntityId, DurationSummary)> = summaries.into_iter().collect();
    ranked.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit.as_len());

    let labels = resolve_labels(session.as_mut(), ranked.iter().map(|(id, _)| *id)).await?;
    let rows: Vec<PitStopSummary> = ranked
        .into_iter()
        .map(|(id, s)| PitStopSummary {
            entity: labels.entity_ref(id),
            pit_stops: s.count,
            avg_ms: s.mean,
            p50_ms: s.median,
            p95_ms: s.p95,
            min_ms: s.min,
            max_ms: s.max,
        })
        .collect();

    tracing::debug!(season, ?group_by, rows = rows.len(), "Computed pit stop summary");
    Ok(rows)
}
