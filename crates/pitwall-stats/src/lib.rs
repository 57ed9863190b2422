//! Statistics aggregation engine for the Pitwall motorsport dashboard.
//!
//! Every query operation takes a [`Dataset`] and a small parameter record,
//! acquires one [`DatasetSession`] for its lifetime, and returns an ordered
//! list or a composite record. Operations hold no process state, so any
//! number of them may run concurrently against one dataset.
//!
//! # Architecture
//!
//! ```text
//! params (validate + clamp)
//!     |
//!     +-- Dataset::session() --> filtered scans (races, results, standings, timing)
//!     |
//!     +-- snapshot   (latest completed race per season)
//!     +-- counter    (wins / podiums / points per entity)
//!     +-- percentile (lap-time and pit-stop distributions)
//!     +-- grid       (start vs finish frequencies)
//!     +-- progression(round-by-round standings of the top N)
//!     |
//!     +-- resolver   (ids --> display names, after pagination)
//! ```
//!
//! # Modules
//!
//! - [`dataset`] -- Dataset access contract and the in-memory implementation
//! - [`params`] -- Parameter records, limit clamping, required-field checks
//! - [`resolver`] -- Identifier to display-name resolution
//! - [`snapshot`] -- Standings snapshot resolution
//! - [`counter`] -- Aggregate counters and win tables
//! - [`percentile`] -- Continuous percentile summaries
//! - [`grid`] -- Grid position versus finish position matrix
//! - [`progression`] -- Points progression series
//! - [`catalog`] -- Seasons, circuits, statuses and season winners
//! - [`profiles`] -- Driver, constructor and circuit detail views
//! - [`error`] -- Error types

pub mod catalog;
pub mod counter;
pub mod dataset;
pub mod error;
pub mod grid;
pub mod params;
pub mod percentile;
pub mod profiles;
pub mod progression;
pub mod resolver;
pub mod snapshot;

// Re-export primary types for convenience.
pub use catalog::{
    CircuitSummary, RaceWinner, Season, SeasonWinners, StatusCount, list_circuits, list_seasons,
    season_winners, status_distribution,
};
pub use counter::{EntityTotals, WinCount, constructor_wins, entity_totals, top_driver_wins};
pub use dataset::{Dataset, DatasetSession, MemoryData, MemoryDataset};
pub use error::{DatasetError, StatsError};
pub use grid::{GridCell, grid_matrix};
pub use params::{
    GridQuery, LapTimeQuery, LimitQuery, ListQuery, PageQuery, PitStopQuery, ProgressionQuery,
    SeasonOnlyQuery, SeasonQuery, StandingsQuery,
};
pub use percentile::{
    DurationSummary, LapTimeStats, PitStopSummary, lap_time_stats, percentile_cont,
    pit_stop_summary,
};
pub use profiles::{
    CircuitDetail, ConstructorDetail, DriverDetail, circuit_detail, constructor_detail,
    driver_detail,
};
pub use progression::{ProgressionPoint, progression};
pub use resolver::EntityRef;
pub use snapshot::{StandingRow, standings_snapshot};
