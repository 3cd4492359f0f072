//! Data models for vehiclestore.
//!
//! The persisted [`Vehicle`] plus the input and output shapes built from it:
//! [`NewVehicle`] for creation, [`VehiclePatch`] for partial updates and
//! [`VehicleView`] for the public projection.

mod vehicle;

pub use vehicle::{NewVehicle, Vehicle, VehicleId, VehiclePatch, VehicleView};
