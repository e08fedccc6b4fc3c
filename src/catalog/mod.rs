//! Vehicle catalog: the leaf collaborator the rental ledger reads from

pub mod model;
pub mod service;

pub use model::{KNOWN_VEHICLE_TYPES, NewVehicle, Vehicle, VehiclePatch};
pub use service::{VehicleCatalog, resolve_image_url};
