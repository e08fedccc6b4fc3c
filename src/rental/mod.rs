//! Rental ledger and everything it owns
//!
//! - [`model`]: the `Rental` record and its status state machine
//! - [`pricing`]: day count and amounts
//! - [`confirmation`]: human-facing confirmation numbers
//! - [`ledger`]: creation, transitions, derived availability
//! - [`subscription`]: live per-user rental lists

pub mod confirmation;
pub mod ledger;
pub mod model;
pub mod pricing;
pub mod subscription;

pub use confirmation::ConfirmationGenerator;
pub use ledger::RentalLedger;
pub use model::{BookingRequest, Receipt, Rental, RentalStats, RentalStatus};
pub use pricing::{Quote, billable_days, number_of_days};
pub use subscription::{RentalSubscription, SubscriptionHandle};
