//! Collection store trait.
//!
//! The store accessor translates between the serialized document and the
//! in-memory collection. It only ever moves the whole collection.
//!
//! # Available Implementations
//!
//! | Backend | Use Case | Revision |
//! |---------|----------|----------|
//! | `JsonFileStore` | Default; single JSON file on disk | SHA-256 of file bytes |
//! | `InMemoryStore` | Tests and embedding | Write counter |
//!
//! # Error Modes and Guarantees
//!
//! | Operation | Failure | Guarantee on failure |
//! |-----------|---------|----------------------|
//! | `read` | `Error::StorageRead` | Nothing changed |
//! | `write` | `Error::StorageWrite` | No guaranteed change; no rollback |
//! | `write` with revision | `Error::Conflict` | Nothing written |
//!
//! Neither call locks across a read and a following write. Two writers that
//! read the same revision and then write without a revision race; the last
//! write wins.

use crate::models::Vehicle;
use crate::storage::{Revision, Snapshot};
use crate::Result;

/// Trait for whole-collection storage backends.
pub trait CollectionStore: Send + Sync {
    /// Loads the full collection together with the revision it was read at.
    fn read(&self) -> Result<Snapshot>;

    /// Replaces the stored collection with `vehicles`.
    ///
    /// When `expected` is `Some`, the write only happens if the stored
    /// revision still equals it; otherwise `Error::Conflict` is returned.
    /// Returns the revision of the newly written document.
    fn write(&self, vehicles: &[Vehicle], expected: Option<&Revision>) -> Result<Revision>;

    /// Returns the current revision.
    fn revision(&self) -> Result<Revision> {
        Ok(self.read()?.revision)
    }
}

impl<S: CollectionStore + ?Sized> CollectionStore for std::sync::Arc<S> {
    fn read(&self) -> Result<Snapshot> {
        (**self).read()
    }

    fn write(&self, vehicles: &[Vehicle], expected: Option<&Revision>) -> Result<Revision> {
        (**self).write(vehicles, expected)
    }

    fn revision(&self) -> Result<Revision> {
        (**self).revision()
    }
}
