//! Parameter records accepted by the query operations, plus the bounds
//! applied to them.
//!
//! Every record derives [`serde::Deserialize`] so a transport layer can
//! decode it straight from a query string. Numeric bounds are applied here,
//! not by callers: limits are clamped to `[1, MAX_LIMIT]`, offsets to `>= 0`,
//! and a missing required season or race is a [`StatsError::Validation`].

use std::fmt;
use std::num::IntErrorKind;
use std::ops::RangeInclusive;

use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

use pitwall_types::EntityKind;

use crate::error::StatsError;

/// Upper bound for every `limit` / `top_n` parameter.
pub const MAX_LIMIT: u32 = 200;

/// Seasons accepted by season-scoped operations.
pub const SEASONS: RangeInclusive<i32> = 1950..=2100;

/// A row-count bound clamped to `[1, MAX_LIMIT]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(u32);

impl Limit {
    /// Clamp a requested limit, falling back to `default` when absent.
    pub fn clamped(requested: Option<i64>, default: u32) -> Self {
        let value = requested.map_or(i64::from(default), |v| v.clamp(1, i64::from(MAX_LIMIT)));
        Self(u32::try_from(value).unwrap_or(MAX_LIMIT).clamp(1, MAX_LIMIT))
    }

    /// The clamped value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// The clamped value as a collection length.
    pub fn as_len(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

/// A `limit`/`offset` window over an ordered row set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum rows returned.
    pub limit: Limit,
    /// Rows skipped before the window starts.
    pub offset: usize,
}

impl Page {
    /// Build a window from raw parameters. Negative offsets clamp to zero.
    pub fn new(limit: Option<i64>, offset: Option<i64>, default_limit: u32) -> Self {
        let offset = offset.map_or(0, |o| usize::try_from(o.max(0)).unwrap_or(usize::MAX));
        Self {
            limit: Limit::clamped(limit, default_limit),
            offset,
        }
    }

    /// Apply the window to an already ordered row set.
    pub fn apply<T>(self, rows: Vec<T>) -> Vec<T> {
        rows.into_iter()
            .skip(self.offset)
            .take(self.limit.as_len())
            .collect()
    }
}

/// Reject a missing required parameter.
pub fn require<T>(name: &str, value: Option<T>) -> Result<T, StatsError> {
    value.ok_or_else(|| StatsError::Validation(format!("{name} is required")))
}

/// Reject a season outside [`SEASONS`]. An absent season passes.
pub fn check_season(season: Option<i32>) -> Result<Option<i32>, StatsError> {
    match season {
        Some(year) if !SEASONS.contains(&year) => Err(StatsError::Validation(format!(
            "season must be between {} and {}",
            SEASONS.start(),
            SEASONS.end()
        ))),
        other => Ok(other),
    }
}

/// A season that must be present and within [`SEASONS`].
pub fn require_season(season: Option<i32>) -> Result<i32, StatsError> {
    require("season", check_season(season)?)
}

/// Decode an optional integer bound, saturating values outside `i64`.
///
/// Limits and offsets are clamped afterwards, so `99999999999999999999`
/// must read as "very large" rather than fail. Non-numeric text is still
/// rejected.
fn saturating_bound<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    deserializer.deserialize_option(OptionalBound)
}

struct OptionalBound;

impl<'de> Visitor<'de> for OptionalBound {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an optional integer")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(Bound).map(Some)
    }
}

struct Bound;

impl Visitor<'_> for Bound {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        Ok(i64::try_from(v).unwrap_or(i64::MAX))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
        match v.parse::<i64>() {
            Ok(n) => Ok(n),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(i64::MAX),
                IntErrorKind::NegOverflow => Ok(i64::MIN),
                _ => Err(E::invalid_value(de::Unexpected::Str(v), &self)),
            },
        }
    }
}

/// Parameters for list operations with optional season scope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Restrict counting to one season.
    pub season: Option<i32>,
    /// Page size (default varies per operation).
    #[serde(default, deserialize_with = "saturating_bound")]
    pub limit: Option<i64>,
    /// Rows to skip.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub offset: Option<i64>,
}

/// Parameters for unscoped paged lists.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    /// Page size.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub limit: Option<i64>,
    /// Rows to skip.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub offset: Option<i64>,
}

/// Parameters for operations that only take a top-N bound.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    /// Maximum rows returned.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub limit: Option<i64>,
}

/// A required season and nothing else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonOnlyQuery {
    /// Season year (required).
    pub season: Option<i32>,
}

/// Parameters for season-scoped operations with a row bound.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeasonQuery {
    /// Season year (required).
    pub season: Option<i32>,
    /// Maximum rows returned.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub limit: Option<i64>,
}

/// Parameters for a standings snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsQuery {
    /// Season year (required).
    pub season: Option<i32>,
    /// Only consider races up to and including this round.
    pub round: Option<i32>,
    /// Maximum rows returned.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub limit: Option<i64>,
}

/// Parameters for the pit-stop summary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PitStopQuery {
    /// Season year (required).
    pub season: Option<i32>,
    /// Narrow to one race of the season.
    pub race_id: Option<i32>,
    /// Group by driver (default) or constructor.
    pub group_by: Option<EntityKind>,
    /// Maximum rows returned.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub limit: Option<i64>,
}

/// Parameters for per-driver lap-time statistics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LapTimeQuery {
    /// Race (required).
    pub race_id: Option<i32>,
    /// Narrow to one driver.
    pub driver_id: Option<i32>,
    /// Maximum rows returned.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub top_n: Option<i64>,
}

/// Parameters for the start/finish matrix.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridQuery {
    /// Season year (required).
    pub season: Option<i32>,
    /// Narrow to one race of the season.
    pub race_id: Option<i32>,
}

/// Parameters for round-by-round progression.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgressionQuery {
    /// Season year (required).
    pub season: Option<i32>,
    /// Size of the cohort taken from the final standings.
    #[serde(default, deserialize_with = "saturating_bound")]
    pub top_n: Option<i64>,
}
