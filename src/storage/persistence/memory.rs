//! In-memory collection store.
//!
//! Holds the collection in process memory with the same whole-collection
//! semantics as the file store. Data is not persisted between runs.

use crate::models::Vehicle;
use crate::storage::traits::CollectionStore;
use crate::storage::{Revision, Snapshot};
use crate::{Error, Result};
use std::path::PathBuf;
use std::sync::RwLock;

#[derive(Debug, Default)]
struct State {
    vehicles: Vec<Vehicle>,
    version: u64,
}

impl State {
    fn revision(&self) -> Revision {
        Revision::new(format!("mem-{}", self.version))
    }
}

/// In-memory collection store.
///
/// Uses `RwLock` for thread-safe access. Each successful write bumps a
/// counter that serves as the revision.
///
/// # Example
///
/// ```rust
/// use vehiclestore::{CollectionStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// assert!(store.read()?.vehicles.is_empty());
/// # Ok::<(), vehiclestore::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `vehicles`.
    #[must_use]
    pub fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        Self {
            state: RwLock::new(State {
                vehicles,
                version: 0,
            }),
        }
    }

    fn location() -> PathBuf {
        PathBuf::from("<memory>")
    }
}

impl CollectionStore for InMemoryStore {
    fn read(&self) -> Result<Snapshot> {
        let state = self.state.read().map_err(|_| Error::StorageRead {
            path: Self::location(),
            cause: "lock poisoned".to_string(),
        })?;

        Ok(Snapshot {
            vehicles: state.vehicles.clone(),
            revision: state.revision(),
        })
    }

    fn write(&self, vehicles: &[Vehicle], expected: Option<&Revision>) -> Result<Revision> {
        let mut state = self.state.write().map_err(|_| Error::StorageWrite {
            path: Self::location(),
            cause: "lock poisoned".to_string(),
        })?;

        if let Some(expected) = expected {
            let actual = state.revision();
            if &actual != expected {
                return Err(Error::Conflict {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        state.vehicles = vehicles.to_vec();
        state.version += 1;
        Ok(state.revision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewVehicle, VehicleId};

    fn vehicle(id: u64) -> Vehicle {
        Vehicle::from_new(VehicleId::new(id), NewVehicle::new("Gol", "d", "Hatch", true))
    }

    #[test]
    fn test_seeded_read() {
        let store = InMemoryStore::with_vehicles(vec![vehicle(1), vehicle(2)]);
        let snapshot = store.read().unwrap();

        assert_eq!(snapshot.vehicles.len(), 2);
        assert_eq!(snapshot.revision, Revision::new("mem-0"));
    }

    #[test]
    fn test_write_bumps_revision() {
        let store = InMemoryStore::new();
        let first = store.write(&[vehicle(1)], None).unwrap();
        let second = store.write(&[vehicle(1), vehicle(2)], Some(&first)).unwrap();

        assert_ne!(first, second);
        assert_eq!(store.revision().unwrap(), second);
    }

    #[test]
    fn test_stale_revision_conflicts() {
        let store = InMemoryStore::new();
        let stale = store.revision().unwrap();
        store.write(&[vehicle(1)], None).unwrap();

        let err = store.write(&[], Some(&stale)).unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(store.read().unwrap().vehicles.len(), 1);
    }
}
