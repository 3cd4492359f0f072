//! Record-level operations over the stored collection.

mod vehicles;

pub use vehicles::{DeleteOutcome, VehicleRepository};
