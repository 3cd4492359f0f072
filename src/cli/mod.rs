//! CLI command implementations.
//!
//! Each command maps onto one repository operation and writes its result as
//! JSON to the supplied writer. Input parsing (identifiers, patch documents,
//! required creation fields) happens here, before the repository is called.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `init` | Create an empty store document |
//! | `list` | Print every vehicle |
//! | `get` | Print one vehicle by id |
//! | `category` | Print vehicles in a category |
//! | `create` | Add a vehicle and print the whole collection |
//! | `update` | Merge a JSON patch into a vehicle |
//! | `delete` | Remove a vehicle |
//!
//! # Example Usage
//!
//! ```bash
//! vehiclestore --store fleet.json init
//! vehiclestore create --name Corolla --description "Compact sedan" --category Sedan --active true
//! vehiclestore update 1 '{"active": false}'
//! vehiclestore category Sedan
//! ```

mod init;
mod vehicles;

pub use init::cmd_init;
pub use vehicles::{
    CreateArgs, cmd_category, cmd_create, cmd_delete, cmd_get, cmd_list, cmd_update,
};

use crate::config::VehicleStoreConfig;
use crate::models::VehicleId;
use crate::repository::VehicleRepository;
use crate::storage::JsonFileStore;
use crate::{Error, Result};
use serde::Serialize;
use std::io::Write;

/// What a command reports back to the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// The command did what was asked.
    Success,
    /// The addressed vehicle does not exist.
    NotFound(VehicleId),
}

impl CommandStatus {
    /// Returns true for [`CommandStatus::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Opens the repository described by `config`.
#[must_use]
pub fn open_repository(config: &VehicleStoreConfig) -> VehicleRepository<JsonFileStore> {
    let store = JsonFileStore::new(&config.store_path).with_max_file_size(config.max_file_size);
    VehicleRepository::new(store, config.concurrency)
}

/// Writes `value` as pretty JSON followed by a newline.
fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(|e| output_error(&e))?;
    writeln!(out).map_err(|e| output_error(&e))
}

fn output_error(e: &impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    }
}
