//! Type-safe identifier wrappers around the dataset's integer keys.
//!
//! Every entity in the dataset is keyed by a 32-bit integer assigned by the
//! upstream ingestion process. Wrapping each key in its own type prevents
//! passing a driver identifier where a constructor identifier is expected.
//!
//! `RaceId` carries one extra contract: identifiers increase monotonically
//! with chronological order, both within and across seasons. The standings
//! snapshot resolver relies on it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `i32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub i32);

        impl $name {
            /// Return the inner integer key.
            pub const fn into_inner(self) -> i32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a race (one round of one season).
    RaceId
}

define_id! {
    /// Unique identifier for a driver.
    DriverId
}

define_id! {
    /// Unique identifier for a constructor (team).
    ConstructorId
}

define_id! {
    /// Unique identifier for a circuit.
    CircuitId
}

define_id! {
    /// Unique identifier for a finish/retirement status.
    StatusId
}
