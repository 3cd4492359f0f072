//! Collection store implementations.

mod json_file;
mod memory;

pub use json_file::{DEFAULT_MAX_FILE_SIZE, JsonFileStore};
pub use memory::InMemoryStore;
