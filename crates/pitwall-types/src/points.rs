//! Championship point quantities.
//!
//! The dataset records points in two shapes that look identical on the
//! wire but mean different things:
//!
//! - [`RacePoints`]: points scored in a single race result. These add up.
//! - [`CumulativeStandingPoints`]: the running total a standings entry
//!   carries after a race. Adding two of these double counts every race
//!   before the later one, so the type deliberately has no `Add`.
//!
//! [`PointsTotal`] is the only place the two meet: an aggregate reports
//! one or the other depending on its scope, never a mix.

use core::cmp::Ordering;
use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Points scored in one race result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct RacePoints(pub f64);

impl RacePoints {
    /// Zero points.
    pub const ZERO: Self = Self(0.0);

    /// Return the raw value.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl Add for RacePoints {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for RacePoints {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Running championship total carried by a standings entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct CumulativeStandingPoints(pub f64);

impl CumulativeStandingPoints {
    /// Return the raw value.
    pub const fn value(self) -> f64 {
        self.0
    }
}

/// A points figure reported by an aggregate, tagged with its scope.
///
/// Serializes as a bare number; the tag only exists on the Rust side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PointsTotal {
    /// Season-scoped: the entity's standing total after the season's
    /// latest completed race.
    Season(CumulativeStandingPoints),
    /// Unscoped: the sum of every per-race result.
    Career(RacePoints),
}

impl PointsTotal {
    /// Return the raw value regardless of scope.
    pub const fn value(self) -> f64 {
        match self {
            Self::Season(p) => p.value(),
            Self::Career(p) => p.value(),
        }
    }

    /// Total ordering over the raw values (NaN sorts last).
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.value().total_cmp(&other.value())
    }
}
