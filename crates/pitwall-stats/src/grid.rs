//! Start-versus-finish frequency matrix.

use std::collections::BTreeMap;

use serde::Serialize;

use pitwall_types::{RaceId, RaceResult};

use crate::dataset::{Dataset, ResultFilter};
use crate::error::StatsError;
use crate::params::{GridQuery, require_season};

/// One observed (start, finish) pair and how often it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridCell {
    /// Grid slot at the start.
    pub start_position: i32,
    /// Classified finishing position.
    pub finish_position: i32,
    /// Results with this pair.
    pub count: u64,
}

/// Count (grid, position) pairs over results where both are present.
///
/// Cells come back sorted by start then finish. Pairs never observed are
/// not emitted.
pub fn grid_cells<'a>(results: impl IntoIterator<Item = &'a RaceResult>) -> Vec<GridCell> {
    let mut counts: BTreeMap<(i32, i32), u64> = BTreeMap::new();
    for result in results {
        if let (Some(start), Some(finish)) = (result.grid, result.position) {
            let count = counts.entry((start, finish)).or_default();
            *count = count.saturating_add(1);
        }
    }
    counts
        .into_iter()
        .map(|((start_position, finish_position), count)| GridCell {
            start_position,
            finish_position,
            count,
        })
        .collect()
}

/// The sparse start/finish matrix for a season, or one race of it.
///
/// # Errors
///
/// Returns [`StatsError::Validation`] when `season` is absent and
/// [`StatsError::DatasetUnavailable`] when a scan fails.
pub async fn grid_matrix(
    dataset: &dyn Dataset,
    query: &GridQuery,
) -> Result<Vec<GridCell>, StatsError> {
    let season = require_season(query.season)?;
    let mut session = dataset.session().await?;
    let results = session
        .results(&ResultFilter {
            year: Some(season),
            race_id: query.race_id.map(RaceId),
            ..ResultFilter::default()
        })
        .await?;
    let cells = grid_cells(&results);
    tracing::debug!(season, race_id = ?query.race_id, cells = cells.len(), "Built grid matrix");
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use pitwall_types::{ConstructorId, DriverId};

    use super::*;

    fn result(grid: Option<i32>, position: Option<i32>) -> RaceResult {
        RaceResult {
            race_id: RaceId(1),
            driver_id: DriverId(1),
            constructor_id: ConstructorId(1),
            grid,
            position,
            points: None,
            status_id: None,
        }
    }

    #[test]
    fn pairs_with_a_missing_side_are_skipped() {
        let results = [
            result(Some(1), Some(1)),
            result(Some(1), None),
            result(None, Some(2)),
            result(Some(3), Some(2)),
            result(Some(1), Some(1)),
        ];
        let cells = grid_cells(&results);
        assert_eq!(
            cells,
            vec![
                GridCell { start_position: 1, finish_position: 1, count: 2 },
                GridCell { start_position: 3, finish_position: 2, count: 1 },
            ]
        );
        assert_eq!(cells.iter().map(|c| c.count).sum::<u64>(), 3);
    }

    #[test]
    fn pit_lane_start_is_a_real_slot() {
        let cells = grid_cells(&[result(Some(0), Some(12))]);
        assert_eq!(cells[0].start_position, 0);
    }

    #[test]
    fn cells_sort_by_start_then_finish() {
        let results = [
            result(Some(2), Some(5)),
            result(Some(1), Some(9)),
            result(Some(2), Some(1)),
        ];
        let order: Vec<(i32, i32)> = grid_cells(&results)
            .iter()
            .map(|c| (c.start_position, c.finish_position))
            .collect();
        assert_eq!(order, vec![(1, 9), (2, 1), (2, 5)]);
    }
}
