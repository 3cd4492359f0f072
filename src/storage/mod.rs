//! Storage layer.
//!
//! The collection is persisted as a single document:
//!
//! ```json
//! { "vehicles": [ { "id": 1, "name": "Corolla", ... } ] }
//! ```
//!
//! Backends implement [`CollectionStore`], which reads and writes that
//! document as a whole. Each read carries a [`Revision`] so that a later
//! write can refuse to overwrite a document someone else changed.

pub mod persistence;
pub mod traits;

pub use persistence::{InMemoryStore, JsonFileStore};
pub use traits::CollectionStore;

use crate::models::Vehicle;
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque token identifying one version of the stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision(String);

impl Revision {
    /// Creates a revision from a raw token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Derives the revision of a serialized document (hex SHA-256).
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(hex::encode(hasher.finalize()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The full collection as read at one revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Vehicles in storage order.
    pub vehicles: Vec<Vehicle>,
    /// Revision the collection was read at.
    pub revision: Revision,
}

impl Snapshot {
    /// Returns the highest identifier in the collection, if any.
    #[must_use]
    pub fn max_id(&self) -> Option<crate::models::VehicleId> {
        self.vehicles.iter().map(|v| v.id).max()
    }

    /// Returns the index of the first vehicle with `id`.
    #[must_use]
    pub fn position(&self, id: crate::models::VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| v.id == id)
    }
}
