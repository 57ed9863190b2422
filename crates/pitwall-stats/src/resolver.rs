//! Entity resolution: identifiers to display attributes.
//!
//! Every operation collects the identifiers it is about to emit and
//! resolves them in one scan per entity kind, after ordering and
//! pagination, so only rows that reach the caller are looked up.

use std::collections::{BTreeMap, BTreeSet};

use serde::ser::{Serialize, SerializeMap, Serializer};

use pitwall_types::{
    Circuit, CircuitId, Constructor, ConstructorId, Driver, DriverId, EntityId,
};

use crate::dataset::DatasetSession;
use crate::error::DatasetError;

/// Display attributes shared by drivers and constructors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityLabel {
    /// Display name (driver: `forename surname`; constructor: team name).
    pub name: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
}

/// An identifier paired with its display name.
///
/// Serializes as two keys that depend on the kind:
/// `driverId` + `driver_name` or `constructorId` + `constructor_name`.
/// Intended to be `#[serde(flatten)]`ed into output rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    /// The entity.
    pub id: EntityId,
    /// Its display name, if resolvable.
    pub name: Option<String>,
}

impl Serialize for EntityRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self.id {
            EntityId::Driver(id) => {
                map.serialize_entry("driverId", &id)?;
                map.serialize_entry("driver_name", &self.name)?;
            }
            EntityId::Constructor(id) => {
                map.serialize_entry("constructorId", &id)?;
                map.serialize_entry("constructor_name", &self.name)?;
            }
        }
        map.end()
    }
}

/// Resolved labels for a set of entities.
#[derive(Debug, Clone, Default)]
pub struct LabelBook {
    labels: BTreeMap<EntityId, EntityLabel>,
}

impl LabelBook {
    /// Label of `id`, or an empty label if it did not resolve.
    pub fn label(&self, id: EntityId) -> EntityLabel {
        self.labels.get(&id).cloned().unwrap_or_default()
    }

    /// Identifier plus display name.
    pub fn entity_ref(&self, id: EntityId) -> EntityRef {
        EntityRef {
            id,
            name: self.labels.get(&id).and_then(|l| l.name.clone()),
        }
    }
}

/// Resolve drivers by id. Unknown ids are simply absent from the map.
pub async fn resolve_drivers(
    session: &mut dyn DatasetSession,
    ids: &BTreeSet<DriverId>,
) -> Result<BTreeMap<DriverId, Driver>, DatasetError> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let ids: Vec<DriverId> = ids.iter().copied().collect();
    let rows = session.drivers(Some(&ids)).await?;
    Ok(rows.into_iter().map(|d| (d.driver_id, d)).collect())
}

/// Resolve constructors by id. Unknown ids are simply absent from the map.
pub async fn resolve_constructors(
    session: &mut dyn DatasetSession,
    ids: &BTreeSet<ConstructorId>,
) -> Result<BTreeMap<ConstructorId, Constructor>, DatasetError> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let ids: Vec<ConstructorId> = ids.iter().copied().collect();
    let rows = session.constructors(Some(&ids)).await?;
    Ok(rows.into_iter().map(|c| (c.constructor_id, c)).collect())
}

/// Resolve circuits by id. Unknown ids are simply absent from the map.
pub async fn resolve_circuits(
    session: &mut dyn DatasetSession,
    ids: &BTreeSet<CircuitId>,
) -> Result<BTreeMap<CircuitId, Circuit>, DatasetError> {
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    let ids: Vec<CircuitId> = ids.iter().copied().collect();
    let rows = session.circuits(Some(&ids)).await?;
    Ok(rows.into_iter().map(|c| (c.circuit_id, c)).collect())
}

/// Resolve labels for a mixed set of drivers and constructors.
pub async fn resolve_labels(
    session: &mut dyn DatasetSession,
    ids: impl IntoIterator<Item = EntityId> + Send,
) -> Result<LabelBook, DatasetError> {
    let mut drivers = BTreeSet::new();
    let mut constructors = BTreeSet::new();
    for id in ids {
        match id {
            EntityId::Driver(d) => {
                drivers.insert(d);
            }
            EntityId::Constructor(c) => {
                constructors.insert(c);
            }
        }
    }

    let mut labels = BTreeMap::new();
    for (id, driver) in resolve_drivers(session, &drivers).await? {
        labels.insert(
            EntityId::Driver(id),
            EntityLabel {
                name: driver.display_name(),
                nationality: driver.nationality,
            },
        );
    }
    for (id, constructor) in resolve_constructors(session, &constructors).await? {
        labels.insert(
            EntityId::Constructor(id),
            EntityLabel {
                name: constructor.name,
                nationality: constructor.nationality,
            },
        );
    }

    Ok(LabelBook { labels })
}
