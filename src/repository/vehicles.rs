//! Vehicle repository.
//!
//! Record-level operations built only on [`CollectionStore::read`] and
//! [`CollectionStore::write`]. Mutations run one full cycle each:
//!
//! ```text
//! read() ──► mutate Vec<Vehicle> in memory ──► write(all vehicles)
//! ```
//!
//! The repository keeps no collection state between calls.

use crate::config::ConcurrencyMode;
use crate::models::{NewVehicle, Vehicle, VehicleId, VehiclePatch};
use crate::storage::{CollectionStore, Snapshot};
use crate::{Error, Result};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::instrument;

/// Result of a delete.
///
/// Storage failures are reported through `Err`, so callers can tell
/// "nothing to delete" apart from "could not delete".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The vehicle existed and the collection was rewritten without it.
    Deleted,
    /// No vehicle had the identifier; the store was not written.
    NotFound,
}

impl DeleteOutcome {
    /// Returns `true` if a vehicle was removed.
    #[must_use]
    pub const fn is_deleted(self) -> bool {
        matches!(self, Self::Deleted)
    }
}

/// What a mutation closure decided.
enum Step<T> {
    /// Write the mutated collection, then return the value.
    Commit(T),
    /// Return the value without writing.
    Skip(T),
}

/// CRUD over vehicles backed by a [`CollectionStore`].
///
/// Cloning is cheap; clones share the store and, in
/// [`ConcurrencyMode::Serialized`], the cycle lock.
///
/// # Concurrency
///
/// | Mode | Overlapping mutations |
/// |------|-----------------------|
/// | `LastWriteWins` | Each cycle reads and writes independently; the last write wins and earlier changes are lost |
/// | `Serialized` | Cycles on this repository and its clones run one at a time |
/// | `Optimistic` | A cycle whose store changed after its read fails with `Error::Conflict` |
///
/// Reads never block.
pub struct VehicleRepository<S: CollectionStore> {
    store: Arc<S>,
    mode: ConcurrencyMode,
    cycle_lock: Arc<Mutex<()>>,
}

impl<S: CollectionStore> Clone for VehicleRepository<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            mode: self.mode,
            cycle_lock: Arc::clone(&self.cycle_lock),
        }
    }
}

impl<S: CollectionStore> VehicleRepository<S> {
    /// Creates a repository over `store`.
    pub fn new(store: S, mode: ConcurrencyMode) -> Self {
        Self::from_arc(Arc::new(store), mode)
    }

    /// Creates a repository over a shared store.
    pub fn from_arc(store: Arc<S>, mode: ConcurrencyMode) -> Self {
        Self {
            store,
            mode,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the concurrency mode.
    pub const fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Returns every vehicle in storage order.
    #[instrument(skip(self), fields(operation = "list_all"))]
    pub fn list_all(&self) -> Result<Vec<Vehicle>> {
        let result = self.store.read().map(|s| s.vehicles);
        record("list_all", status_of(&result, |_| true));
        result
    }

    /// Returns the first vehicle with `id`, or `None`.
    #[instrument(skip(self), fields(operation = "find_by_id", id = %id))]
    pub fn find_by_id(&self, id: VehicleId) -> Result<Option<Vehicle>> {
        let result = self
            .store
            .read()
            .map(|s| s.vehicles.into_iter().find(|v| v.id == id));
        record("find_by_id", status_of(&result, Option::is_some));
        result
    }

    /// Returns the vehicles whose category equals `category` exactly.
    #[instrument(skip(self), fields(operation = "find_by_category"))]
    pub fn find_by_category(&self, category: &str) -> Result<Vec<Vehicle>> {
        let result = self.store.read().map(|s| {
            s.vehicles
                .into_iter()
                .filter(|v| v.category == category)
                .collect::<Vec<_>>()
        });
        record("find_by_category", status_of(&result, |v| !v.is_empty()));
        result
    }

    /// Appends a vehicle and returns the updated collection.
    ///
    /// The new vehicle is last and gets `1 + max(id)`, or
    /// [`VehicleId::BASELINE`] when the collection is empty.
    ///
    /// # Errors
    ///
    /// Storage errors from the read or write, `Error::Conflict` in optimistic
    /// mode, and `Error::OperationFailed` if `u64::MAX` is already taken.
    #[instrument(skip(self, new), fields(operation = "create", category = %new.category))]
    pub fn create(&self, new: NewVehicle) -> Result<Vec<Vehicle>> {
        let result = self.mutate(|snapshot| {
            let id = next_id(snapshot)?;
            snapshot.vehicles.push(Vehicle::from_new(id, new));
            tracing::info!(id = %id, "Created vehicle");
            Ok(Step::Commit(()))
        });
        record("create", status_of(&result, |_| true));
        result.map(|((), vehicles)| vehicles)
    }

    /// Merges `patch` into the vehicle with `id`.
    ///
    /// Returns the updated vehicle, or `None` if no vehicle has `id` (the
    /// store is not written in that case). The identifier never changes.
    #[instrument(skip(self, patch), fields(operation = "partial_update", id = %id))]
    pub fn partial_update(&self, id: VehicleId, patch: VehiclePatch) -> Result<Option<Vehicle>> {
        let result = self.mutate(|snapshot| {
            let Some(vehicle) = snapshot.vehicles.iter_mut().find(|v| v.id == id) else {
                tracing::debug!("Vehicle not found for update");
                return Ok(Step::Skip(None));
            };
            vehicle.apply(patch);
            Ok(Step::Commit(Some(vehicle.clone())))
        });
        let result = result.map(|(updated, _)| updated);
        record("partial_update", status_of(&result, Option::is_some));
        result
    }

    /// Removes the vehicle with `id`.
    ///
    /// Deleting an absent identifier leaves the store untouched.
    #[instrument(skip(self), fields(operation = "delete", id = %id))]
    pub fn delete(&self, id: VehicleId) -> Result<DeleteOutcome> {
        let result = self.mutate(|snapshot| {
            let Some(index) = snapshot.position(id) else {
                tracing::debug!("Vehicle not found for delete");
                return Ok(Step::Skip(DeleteOutcome::NotFound));
            };
            snapshot.vehicles.remove(index);
            tracing::info!("Deleted vehicle");
            Ok(Step::Commit(DeleteOutcome::Deleted))
        });
        let result = result.map(|(outcome, _)| outcome);
        record("delete", status_of(&result, |o| o.is_deleted()));
        result
    }

    /// Runs one read-modify-write cycle under the configured isolation.
    ///
    /// Returns the closure's value and the collection as it now stands.
    fn mutate<T, F>(&self, f: F) -> Result<(T, Vec<Vehicle>)>
    where
        F: FnOnce(&mut Snapshot) -> Result<Step<T>>,
    {
        // The lock only orders cycles; a panic mid-cycle leaves nothing to repair.
        let _guard = match self.mode {
            ConcurrencyMode::Serialized => Some(
                self.cycle_lock
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            ),
            ConcurrencyMode::LastWriteWins | ConcurrencyMode::Optimistic => None,
        };

        let mut snapshot = self.store.read()?;

        match f(&mut snapshot)? {
            Step::Skip(value) => Ok((value, snapshot.vehicles)),
            Step::Commit(value) => {
                let expected = match self.mode {
                    ConcurrencyMode::Optimistic => Some(&snapshot.revision),
                    ConcurrencyMode::LastWriteWins | ConcurrencyMode::Serialized => None,
                };
                self.store.write(&snapshot.vehicles, expected)?;
                Ok((value, snapshot.vehicles))
            },
        }
    }
}

/// Computes the identifier for a new vehicle.
fn next_id(snapshot: &Snapshot) -> Result<VehicleId> {
    match snapshot.max_id() {
        None => Ok(VehicleId::BASELINE),
        Some(max) => max.next().ok_or_else(|| Error::OperationFailed {
            operation: "assign_vehicle_id".to_string(),
            cause: format!("identifier space exhausted after {max}"),
        }),
    }
}

fn status_of<T>(result: &Result<T>, found: impl FnOnce(&T) -> bool) -> &'static str {
    match result {
        Ok(value) if found(value) => "success",
        Ok(_) => "not_found",
        Err(Error::Conflict { .. }) => "conflict",
        Err(_) => "error",
    }
}

fn record(operation: &'static str, status: &'static str) {
    metrics::counter!(
        "vehicle_repository_operations_total",
        "operation" => operation,
        "status" => status
    )
    .increment(1);
}
