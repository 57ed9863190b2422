//! Integration tests for the API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, backed by an in-memory dataset.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use pitwall_api::{AppState, build_router};
use pitwall_stats::{Dataset, DatasetError, DatasetSession, MemoryData, MemoryDataset};
use pitwall_types::{
    Constructor, ConstructorId, CumulativeStandingPoints, Driver, DriverId, EntityId, LapTime,
    Race, RaceId, RacePoints, RaceResult, StandingsEntry,
};
use serde_json::{Value, json};
use tower::ServiceExt;

fn make_dataset() -> MemoryDataset {
    let race = |id: i32, round: i32| Race {
        race_id: RaceId(id),
        year: 2021,
        round,
        name: Some(format!("Round {round}")),
        circuit_id: None,
    };
    let result = |race: i32, driver: i32, team: i32, grid: i32, position: Option<i32>| RaceResult {
        race_id: RaceId(race),
        driver_id: DriverId(driver),
        constructor_id: ConstructorId(team),
        grid: Some(grid),
        position,
        points: Some(RacePoints(if position == Some(1) { 25.0 } else { 18.0 })),
        status_id: None,
    };
    let standing = |race: i32, driver: i32, points: f64, position: i32| StandingsEntry {
        race_id: RaceId(race),
        entity: EntityId::Driver(DriverId(driver)),
        points: Some(CumulativeStandingPoints(points)),
        position: Some(position),
        wins: None,
    };
    let lap = |lap: i32, milliseconds: i32| LapTime {
        race_id: RaceId(1),
        driver_id: DriverId(830),
        lap,
        position: Some(1),
        milliseconds: Some(milliseconds),
    };

    MemoryDataset::new(MemoryData {
        races: vec![race(1, 1), race(2, 2)],
        drivers: vec![
            Driver {
                driver_id: DriverId(830),
                forename: Some("Max".into()),
                surname: Some("Verstappen".into()),
                nationality: Some("Dutch".into()),
                dob: None,
            },
            Driver {
                driver_id: DriverId(1),
                forename: Some("Lewis".into()),
                surname: Some("Hamilton".into()),
                nationality: Some("British".into()),
                dob: None,
            },
        ],
        constructors: vec![Constructor {
            constructor_id: ConstructorId(9),
            name: Some("Red Bull".into()),
            nationality: Some("Austrian".into()),
        }],
        results: vec![
            result(1, 830, 9, 1, Some(1)),
            result(1, 1, 131, 2, Some(2)),
            result(2, 1, 131, 1, Some(1)),
            result(2, 830, 9, 2, Some(2)),
        ],
        driver_standings: vec![
            standing(1, 830, 25.0, 1),
            standing(1, 1, 18.0, 2),
            standing(2, 830, 43.0, 1),
            standing(2, 1, 43.0, 2),
        ],
        lap_times: vec![lap(1, 90_000), lap(2, 92_000)],
        ..MemoryData::default()
    })
}

fn make_router() -> Router {
    build_router(Arc::new(AppState::new(make_dataset())), &[])
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ping() {
    let (status, body) = get(make_router(), "/api/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_driver_standings_uses_original_field_names() {
    let (status, body) = get(make_router(), "/api/driver-standings?season=2021").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[0],
        json!({"driverId": 830, "driver_name": "Max Verstappen", "points": 43.0, "position": 1})
    );
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_lap_time_stats_interpolates() {
    let (status, body) = get(make_router(), "/api/lap-times/stats?race_id=1").await;
    assert_eq!(status, StatusCode::OK);
    let row = &body[0];
    assert_eq!(row["driverId"], json!(830));
    assert_eq!(row["p50_ms"], json!(91_000.0));
    assert_eq!(row["best_ms"], json!(90_000));
    assert_eq!(row["worst_ms"], json!(92_000));
    assert_eq!(row["laps"], json!(2));
    let p95 = row["p95_ms"].as_f64().unwrap();
    assert!((p95 - 91_900.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_heatmap_cells() {
    let (status, body) = get(make_router(), "/api/positions/heatmap?season=2021").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"start_position": 1, "finish_position": 1, "count": 2},
            {"start_position": 2, "finish_position": 2, "count": 2},
        ])
    );
}

#[tokio::test]
async fn test_unknown_driver_returns_null_info() {
    let (status, body) = get(make_router(), "/api/drivers/424242").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"info": null, "history": [], "seasons": []}));
}

#[tokio::test]
async fn test_drivers_list_is_ranked() {
    let (status, body) = get(make_router(), "/api/drivers?season=2021&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    // One win and two podiums each; the tie falls to the lower id.
    assert_eq!(rows[0]["driverId"], json!(1));
    assert_eq!(rows[0]["races"], json!(2));
}

#[tokio::test]
async fn test_season_list_and_winners() {
    let (status, body) = get(make_router(), "/api/seasons").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"year": 2021}]));

    let (status, body) = get(make_router(), "/api/seasons/2021/winners").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["races"][0]["winner"], json!("Max Verstappen"));
    assert_eq!(body["races"][1]["constructor"], Value::Null);
    assert_eq!(body["driver_champion"]["driverId"], json!(830));
    assert_eq!(body["constructor_champion"], Value::Null);
}

#[tokio::test]
async fn test_progression_rows() {
    let (status, body) = get(make_router(), "/api/driver-progress?season=2021&top_n=1").await;
    assert_eq!(status, StatusCode::OK);
    let rounds: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["round"].as_i64().unwrap())
        .collect();
    assert_eq!(rounds, vec![1, 2]);
    assert_eq!(body[0]["grand_prix"], json!("Round 1"));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_missing_season_is_bad_request() {
    let (status, body) = get(make_router(), "/api/constructors-wins").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("season is required"));
    assert_eq!(body["status"], json!(400));
}

#[tokio::test]
async fn test_non_numeric_parameter_is_bad_request() {
    let (status, _) = get(make_router(), "/api/top-drivers-wins?limit=ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(make_router(), "/api/drivers/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_group_by_is_bad_request() {
    let (status, _) = get(
        make_router(),
        "/api/pit-stops/summary?season=2021&group_by=team",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_oversized_limit_is_clamped() {
    let (status, body) = get(make_router(), "/api/top-drivers-wins?limit=100000").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_limit_beyond_integer_range_is_clamped() {
    let (status, body) = get(
        make_router(),
        "/api/drivers?limit=99999999999999999999&offset=-99999999999999999999",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = get(
        make_router(),
        "/api/driver-progress?season=2021&top_n=99999999999999999999",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Dataset failure
// ---------------------------------------------------------------------------

struct DownDataset;

#[async_trait]
impl Dataset for DownDataset {
    async fn session(&self) -> Result<Box<dyn DatasetSession>, DatasetError> {
        Err(DatasetError::Unavailable)
    }
}

#[tokio::test]
async fn test_dataset_failure_is_service_unavailable() {
    let router = build_router(Arc::new(AppState::new(DownDataset)), &[]);
    let (status, body) = get(router, "/api/seasons").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "Database unavailable", "status": 503}));
}

#[tokio::test]
async fn test_ping_does_not_need_the_dataset() {
    let router = build_router(Arc::new(AppState::new(DownDataset)), &[]);
    let (status, _) = get(router, "/api/ping").await;
    assert_eq!(status, StatusCode::OK);
}
