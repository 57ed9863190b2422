//! REST API endpoint handlers.
//!
//! Every handler decodes its parameters, runs one engine operation against
//! the shared dataset, and returns the result as JSON. Malformed query
//! strings and path segments become [`ApiError::Validation`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/ping` | Liveness probe |
//! | `GET` | `/api/top-drivers-wins` | All-time drivers by wins |
//! | `GET` | `/api/constructors-wins` | Constructors by wins in a season |
//! | `GET` | `/api/driver-standings` | Drivers' table after a season's latest race |
//! | `GET` | `/api/constructor-standings` | Constructors' table after a season's latest race |
//! | `GET` | `/api/status-distribution` | Finishing status counts for a season |
//! | `GET` | `/api/circuits` | Circuits with races hosted |
//! | `GET` | `/api/circuits/{id}` | Circuit summary and top winners |
//! | `GET` | `/api/constructors` | Constructor counters |
//! | `GET` | `/api/constructors/{id}` | Constructor summary and seasons |
//! | `GET` | `/api/drivers` | Driver counters |
//! | `GET` | `/api/drivers/{id}` | Driver summary, history and seasons |
//! | `GET` | `/api/seasons` | Seasons, newest first |
//! | `GET` | `/api/seasons/{year}/winners` | Race winners and champions |
//! | `GET` | `/api/pit-stops/summary` | Pit-stop duration distributions |
//! | `GET` | `/api/positions/heatmap` | Grid versus finish frequencies |
//! | `GET` | `/api/lap-times/stats` | Lap-time distributions for a race |
//! | `GET` | `/api/driver-progress` | Points progression of the top drivers |
//! | `GET` | `/api/constructor-progress` | Points progression of the top constructors |

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use pitwall_stats::{
    CircuitDetail, CircuitSummary, ConstructorDetail, DriverDetail, EntityTotals, GridCell,
    GridQuery, LapTimeQuery, LapTimeStats, LimitQuery, ListQuery, PageQuery, PitStopQuery,
    PitStopSummary, ProgressionPoint, ProgressionQuery, Season, SeasonOnlyQuery, SeasonQuery,
    SeasonWinners, StandingRow, StandingsQuery, StatusCount, WinCount,
};
use pitwall_types::{CircuitId, ConstructorId, DriverId, EntityKind};

use crate::error::ApiError;
use crate::state::AppState;

/// Result type returned by every JSON handler.
type ApiResult<T> = Result<Json<T>, ApiError>;

/// Query-string extractor whose rejection is turned into [`ApiError`].
type Params<T> = Result<Query<T>, QueryRejection>;

/// Path extractor whose rejection is turned into [`ApiError`].
type PathId = Result<Path<i32>, PathRejection>;

/// Body of `GET /api/ping`.
#[derive(Debug, serde::Serialize)]
pub struct Pong {
    /// Always `"ok"`.
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

/// Liveness probe. Never touches the dataset.
pub async fn ping() -> Json<Pong> {
    Json(Pong { status: "ok" })
}

/// All-time drivers ranked by race wins.
pub async fn top_drivers_wins(
    State(state): State<Arc<AppState>>,
    params: Params<LimitQuery>,
) -> ApiResult<Vec<WinCount>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::top_driver_wins(state.dataset(), &params).await?,
    ))
}

/// Constructors ranked by wins in one season.
pub async fn constructors_wins(
    State(state): State<Arc<AppState>>,
    params: Params<SeasonQuery>,
) -> ApiResult<Vec<WinCount>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::constructor_wins(state.dataset(), &params).await?,
    ))
}

/// Drivers' championship table.
pub async fn driver_standings(
    State(state): State<Arc<AppState>>,
    params: Params<StandingsQuery>,
) -> ApiResult<Vec<StandingRow>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::standings_snapshot(state.dataset(), EntityKind::Driver, &params).await?,
    ))
}

/// Constructors' championship table.
pub async fn constructor_standings(
    State(state): State<Arc<AppState>>,
    params: Params<StandingsQuery>,
) -> ApiResult<Vec<StandingRow>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::standings_snapshot(state.dataset(), EntityKind::Constructor, &params)
            .await?,
    ))
}

/// Finishing status frequencies for a season.
pub async fn status_distribution(
    State(state): State<Arc<AppState>>,
    params: Params<SeasonOnlyQuery>,
) -> ApiResult<Vec<StatusCount>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::status_distribution(state.dataset(), &params).await?,
    ))
}

// ---------------------------------------------------------------------------
// Circuits, constructors, drivers
// ---------------------------------------------------------------------------

/// Circuits by name.
pub async fn list_circuits(
    State(state): State<Arc<AppState>>,
    params: Params<PageQuery>,
) -> ApiResult<Vec<CircuitSummary>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::list_circuits(state.dataset(), &params).await?,
    ))
}

/// One circuit.
pub async fn get_circuit(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> ApiResult<CircuitDetail> {
    let Path(id) = id?;
    Ok(Json(
        pitwall_stats::circuit_detail(state.dataset(), CircuitId(id)).await?,
    ))
}

/// Constructor counters, all time or for one season.
pub async fn list_constructors(
    State(state): State<Arc<AppState>>,
    params: Params<ListQuery>,
) -> ApiResult<Vec<EntityTotals>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::entity_totals(state.dataset(), EntityKind::Constructor, &params).await?,
    ))
}

/// One constructor.
pub async fn get_constructor(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> ApiResult<ConstructorDetail> {
    let Path(id) = id?;
    Ok(Json(
        pitwall_stats::constructor_detail(state.dataset(), ConstructorId(id)).await?,
    ))
}

/// Driver counters, all time or for one season.
pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
    params: Params<ListQuery>,
) -> ApiResult<Vec<EntityTotals>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::entity_totals(state.dataset(), EntityKind::Driver, &params).await?,
    ))
}

/// One driver.
pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    id: PathId,
) -> ApiResult<DriverDetail> {
    let Path(id) = id?;
    Ok(Json(
        pitwall_stats::driver_detail(state.dataset(), DriverId(id)).await?,
    ))
}

// ---------------------------------------------------------------------------
// Seasons
// ---------------------------------------------------------------------------

/// Seasons with at least one race.
pub async fn list_seasons(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Season>> {
    Ok(Json(pitwall_stats::list_seasons(state.dataset()).await?))
}

/// Winners and champions of one season.
pub async fn season_winners(
    State(state): State<Arc<AppState>>,
    year: PathId,
) -> ApiResult<SeasonWinners> {
    let Path(year) = year?;
    Ok(Json(
        pitwall_stats::season_winners(state.dataset(), year).await?,
    ))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// Pit-stop duration summaries.
pub async fn pit_stop_summary(
    State(state): State<Arc<AppState>>,
    params: Params<PitStopQuery>,
) -> ApiResult<Vec<PitStopSummary>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::pit_stop_summary(state.dataset(), &params).await?,
    ))
}

/// Grid versus finish frequencies.
pub async fn position_heatmap(
    State(state): State<Arc<AppState>>,
    params: Params<GridQuery>,
) -> ApiResult<Vec<GridCell>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::grid_matrix(state.dataset(), &params).await?,
    ))
}

/// Lap-time distributions for one race.
pub async fn lap_time_stats(
    State(state): State<Arc<AppState>>,
    params: Params<LapTimeQuery>,
) -> ApiResult<Vec<LapTimeStats>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::lap_time_stats(state.dataset(), &params).await?,
    ))
}

/// Points progression of the season's top drivers.
pub async fn driver_progress(
    State(state): State<Arc<AppState>>,
    params: Params<ProgressionQuery>,
) -> ApiResult<Vec<ProgressionPoint>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::progression(state.dataset(), EntityKind::Driver, &params).await?,
    ))
}

/// Points progression of the season's top constructors.
pub async fn constructor_progress(
    State(state): State<Arc<AppState>>,
    params: Params<ProgressionQuery>,
) -> ApiResult<Vec<ProgressionPoint>> {
    let Query(params) = params?;
    Ok(Json(
        pitwall_stats::progression(state.dataset(), EntityKind::Constructor, &params).await?,
    ))
}
