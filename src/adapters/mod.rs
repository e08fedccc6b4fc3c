//! Session-bound adapters over the rental ledger
//!
//! Each adapter borrows the ledger and the explicit session it acts for.

pub mod admin;
pub mod booking;

pub use admin::{AdminConsole, DashboardStats, VehicleStats};
pub use booking::{BookingDesk, TripRequest};
