//! # vehiclestore
//!
//! A file-backed vehicle repository.
//!
//! The whole collection lives in one JSON document. Every mutating operation
//! reads the full document, changes it in memory and writes it back in full;
//! nothing is cached between operations.
//!
//! ## Layers
//!
//! - [`storage`]: the store accessor ([`CollectionStore`]) with a JSON file
//!   backend and an in-memory backend
//! - [`repository`]: record-level operations ([`VehicleRepository`])
//! - [`config`], [`observability`], [`cli`]: the binary's ambient stack
//!
//! ## Example
//!
//! ```rust,no_run
//! use vehiclestore::{ConcurrencyMode, JsonFileStore, NewVehicle, VehicleRepository};
//!
//! let store = JsonFileStore::with_create("vehicles.json")?;
//! let repo = VehicleRepository::new(store, ConcurrencyMode::Serialized);
//!
//! let vehicles = repo.create(NewVehicle::new("Corolla", "sedan", "Sedan", true))?;
//! let sedans = repo.find_by_category("Sedan")?;
//! assert_eq!(vehicles.len(), sedans.len());
//! # Ok::<(), vehiclestore::Error>(())
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;
use thiserror::Error as ThisError;

pub mod cli;
pub mod config;
pub mod models;
pub mod observability;
pub mod repository;
pub mod storage;

pub use config::{ConcurrencyMode, VehicleStoreConfig};
pub use models::{NewVehicle, Vehicle, VehicleId, VehiclePatch, VehicleView};
pub use repository::{DeleteOutcome, VehicleRepository};
pub use storage::{CollectionStore, InMemoryStore, JsonFileStore, Revision, Snapshot};

/// Error type for vehiclestore operations.
///
/// "Not found" is not an error: lookups return `Option` and deletes return
/// [`DeleteOutcome`].
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `StorageRead` | Store file missing, unreadable, oversized or not a valid document |
/// | `StorageWrite` | Collection could not be serialized or the file rewritten |
/// | `Conflict` | Optimistic revision check failed at write time |
/// | `InvalidInput` | Caller input (CLI arguments, patch JSON, config values) is malformed |
/// | `OperationFailed` | Config loading, logging setup, identifier space exhausted |
#[derive(Debug, ThisError)]
pub enum Error {
    /// The backing store could not be read or parsed.
    #[error("failed to read store {}: {cause}", path.display())]
    StorageRead {
        /// Location of the store.
        path: PathBuf,
        /// The underlying cause.
        cause: String,
    },

    /// The backing store could not be rewritten.
    ///
    /// The on-disk document may or may not have changed; callers must not
    /// assume a rollback happened.
    #[error("failed to write store {}: {cause}", path.display())]
    StorageWrite {
        /// Location of the store.
        path: PathBuf,
        /// The underlying cause.
        cause: String,
    },

    /// The document changed between read and write.
    #[error("store changed concurrently (expected revision {expected}, found {actual})")]
    Conflict {
        /// Revision observed when the cycle started.
        expected: String,
        /// Revision found at write time.
        actual: String,
    },

    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },
}

impl Error {
    /// Returns `true` for read or write failures of the backing store.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::StorageRead { .. } | Self::StorageWrite { .. })
    }
}

/// Result type alias for vehiclestore operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "test".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'test' failed: failed");

        let err = Error::StorageRead {
            path: PathBuf::from("/tmp/vehicles.json"),
            cause: "No such file or directory".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read store /tmp/vehicles.json: No such file or directory"
        );
        assert!(err.is_storage());

        let err = Error::Conflict {
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert!(err.to_string().contains("expected revision aa"));
        assert!(!err.is_storage());
    }
}
