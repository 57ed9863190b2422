//! Axum router construction.
//!
//! Assembles every route into a single [`Router`] with CORS and request
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the CORS layer.
///
/// An empty origin list allows any origin. Only `GET` is ever served.
pub fn cors_layer(allowed_origins: &[HeaderValue]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed_origins.iter().cloned())
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET])
        .allow_headers(Any)
}

/// Build the complete Axum router.
///
/// See [`handlers`] for the route table.
pub fn build_router(state: Arc<AppState>, allowed_origins: &[HeaderValue]) -> Router {
    Router::new()
        .route("/api/ping", get(handlers::ping))
        // Overview
        .route("/api/top-drivers-wins", get(handlers::top_drivers_wins))
        .route("/api/constructors-wins", get(handlers::constructors_wins))
        .route("/api/driver-standings", get(handlers::driver_standings))
        .route(
            "/api/constructor-standings",
            get(handlers::constructor_standings),
        )
        .route("/api/status-distribution", get(handlers::status_distribution))
        // Circuits, constructors, drivers
        .route("/api/circuits", get(handlers::list_circuits))
        .route("/api/circuits/{id}", get(handlers::get_circuit))
        .route("/api/constructors", get(handlers::list_constructors))
        .route("/api/constructors/{id}", get(handlers::get_constructor))
        .route("/api/drivers", get(handlers::list_drivers))
        .route("/api/drivers/{id}", get(handlers::get_driver))
        // Seasons
        .route("/api/seasons", get(handlers::list_seasons))
        .route("/api/seasons/{year}/winners", get(handlers::season_winners))
        // Analytics
        .route("/api/pit-stops/summary", get(handlers::pit_stop_summary))
        .route("/api/positions/heatmap", get(handlers::position_heatmap))
        .route("/api/lap-times/stats", get(handlers::lap_time_stats))
        .route("/api/driver-progress", get(handlers::driver_progress))
        .route(
            "/api/constructor-progress",
            get(handlers::constructor_progress),
        )
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
