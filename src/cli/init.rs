//! Init CLI command.

use crate::Result;
use crate::cli::{CommandStatus, write_json};
use crate::config::VehicleStoreConfig;
use crate::storage::JsonFileStore;
use std::io::Write;

/// Creates the store document if it does not exist yet.
///
/// An existing document is left untouched. Prints the store path.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created.
pub fn cmd_init<W: Write>(config: &VehicleStoreConfig, out: &mut W) -> Result<CommandStatus> {
    let store = JsonFileStore::with_create(&config.store_path)?;
    write_json(
        out,
        &serde_json::json!({ "store": store.path().display().to_string() }),
    )?;
    Ok(CommandStatus::Success)
}
