//! JSON file collection store.
//!
//! Keeps the entire collection in one JSON document on disk. Every read loads
//! and parses the whole file; every write serializes the whole collection and
//! overwrites the file in place.
//!
//! # Guarantees
//!
//! - **No partial parse**: a missing, oversized or malformed file fails the
//!   read outright.
//! - **Never writes what it cannot read**: a document larger than the size
//!   limit is refused before the file is touched.
//! - **Other top-level keys survive**: the document is re-read at write time
//!   and only `vehicles` is replaced.
//! - **Unknown record keys survive**: keys inside a vehicle that the model does
//!   not name are carried on [`Vehicle`] and written back.
//! - **No atomic rename**: a failed write may leave the old document, a
//!   truncated one, or the new one.
//!
//! Compare-and-write for revision checks is serialized by a mutex inside the
//! process. Nothing coordinates separate processes.

use crate::models::Vehicle;
use crate::storage::traits::CollectionStore;
use crate::storage::{Revision, Snapshot};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Default maximum document size (10MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Document shape on read.
#[derive(Debug, Deserialize)]
struct StoredDocument {
    vehicles: Vec<Vehicle>,
}

/// Document shape on write; `extra` carries unrelated top-level keys.
#[derive(Serialize)]
struct DocumentRef<'a> {
    vehicles: &'a [Vehicle],
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

/// File-backed collection store.
#[derive(Debug)]
pub struct JsonFileStore {
    /// Location of the JSON document.
    path: PathBuf,
    /// Reads of larger files are rejected.
    max_file_size: u64,
    /// Serializes compare-and-write within the process.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store over an existing document.
    ///
    /// Nothing is touched on disk; a missing file surfaces on the first read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates a store, creating parent directories and an empty document
    /// if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageWrite` if the directory or file cannot be created.
    pub fn with_create(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);

        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| store.write_error(&e))?;
        }

        if !store.path.exists() {
            store.write_document(&[], &Map::new())?;
            tracing::info!(path = %store.path.display(), "Created empty vehicle store");
        }

        Ok(store)
    }

    /// Sets the maximum accepted document size in bytes.
    #[must_use]
    pub const fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Returns the document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, cause: impl ToString) -> Error {
        Error::StorageRead {
            path: self.path.clone(),
            cause: cause.to_string(),
        }
    }

    fn write_error(&self, cause: impl ToString) -> Error {
        Error::StorageWrite {
            path: self.path.clone(),
            cause: cause.to_string(),
        }
    }

    /// Reads the raw document bytes, enforcing the size limit.
    fn read_bytes(&self) -> Result<Vec<u8>> {
        let metadata = fs::metadata(&self.path).map_err(|e| self.read_error(e))?;

        if metadata.len() > self.max_file_size {
            return Err(self.read_error(format!(
                "document exceeds maximum size of {} bytes",
                self.max_file_size
            )));
        }

        fs::read(&self.path).map_err(|e| self.read_error(e))
    }

    /// Reads the current bytes for a write, treating a missing file as absent.
    fn current_bytes(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.write_error(e)),
        }
    }

    /// Serializes and writes the document, returning its revision.
    fn write_document(&self, vehicles: &[Vehicle], extra: &Map<String, Value>) -> Result<Revision> {
        let doc = DocumentRef { vehicles, extra };
        let json = serde_json::to_vec_pretty(&doc).map_err(|e| self.write_error(e))?;

        // A document over the read limit could never be loaded again.
        if u64::try_from(json.len()).unwrap_or(u64::MAX) > self.max_file_size {
            return Err(self.write_error(format!(
                "document of {} bytes exceeds maximum size of {} bytes",
                json.len(),
                self.max_file_size
            )));
        }

        fs::write(&self.path, &json).map_err(|e| self.write_error(e))?;

        Ok(Revision::of_bytes(&json))
    }
}

/// Extracts every top-level key except `vehicles` from a stored document.
///
/// Unparseable content yields no extra keys; the write then replaces it.
fn extra_keys(bytes: &[u8]) -> Map<String, Value> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(mut map)) => {
            map.remove("vehicles");
            map
        },
        _ => Map::new(),
    }
}

impl CollectionStore for JsonFileStore {
    fn read(&self) -> Result<Snapshot> {
        let bytes = self.read_bytes()?;
        let revision = Revision::of_bytes(&bytes);

        let doc: StoredDocument = serde_json::from_slice(&bytes).map_err(|e| self.read_error(e))?;

        tracing::debug!(
            path = %self.path.display(),
            count = doc.vehicles.len(),
            revision = %revision,
            "Read vehicle store"
        );

        Ok(Snapshot {
            vehicles: doc.vehicles,
            revision,
        })
    }

    fn write(&self, vehicles: &[Vehicle], expected: Option<&Revision>) -> Result<Revision> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| self.write_error("write lock poisoned"))?;

        let current = self.current_bytes()?;

        if let Some(expected) = expected {
            let actual = current
                .as_deref()
                .map_or_else(|| Revision::new("absent"), Revision::of_bytes);
            if &actual != expected {
                metrics::counter!("vehicle_store_writes_total", "status" => "conflict")
                    .increment(1);
                tracing::warn!(
                    path = %self.path.display(),
                    expected = %expected,
                    actual = %actual,
                    "Refusing write: store changed since read"
                );
                return Err(Error::Conflict {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        let extra = current.as_deref().map(extra_keys).unwrap_or_default();

        match self.write_document(vehicles, &extra) {
            Ok(revision) => {
                metrics::counter!("vehicle_store_writes_total", "status" => "success").increment(1);
                tracing::debug!(
                    path = %self.path.display(),
                    count = vehicles.len(),
                    revision = %revision,
                    "Wrote vehicle store"
                );
                Ok(revision)
            },
            Err(e) => {
                metrics::counter!("vehicle_store_writes_total", "status" => "error").increment(1);
                tracing::error!(path = %self.path.display(), error = %e, "Vehicle store write failed");
                Err(e)
            },
        }
    }
}
