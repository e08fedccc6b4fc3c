//! # Velocity Rentals
//!
//! The rental ledger behind the Velocity car-rental product: the customer
//! apps and the admin console all read and write the same rental records
//! through it.
//!
//! ## Features
//!
//! - **Rental lifecycle**: `pending → active → completed`, `pending → cancelled`,
//!   with terminal states enforced and status writes conditional on the status read
//! - **Exclusive occupancy**: at most one pending or active rental per vehicle,
//!   checked atomically with the insert
//! - **Derived availability**: the bookable vehicle list is computed from open
//!   rentals on every call and fails open when rentals cannot be read
//! - **Snapshots**: vehicle and renter fields are copied into the rental at booking time
//! - **Live lists**: per-user rental subscriptions as async streams
//! - **Pluggable storage**: any [`DocumentStore`](core::DocumentStore); an
//!   in-memory store ships with the crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use velocity::prelude::*;
//!
//! let catalog = VehicleCatalog::new(Arc::new(InMemoryDocumentStore::<Vehicle>::new()));
//! let ledger = RentalLedger::new(
//!     Arc::new(InMemoryDocumentStore::<Rental>::new()),
//!     catalog,
//!     LedgerConfig::default(),
//! );
//!
//! let session = CustomerSession::new("uid-1", "Maria Santos", "maria@example.com", "09175550101");
//! let receipt = BookingDesk::new(&ledger, &session)
//!     .book(TripRequest {
//!         vehicle_id,
//!         pickup_date: "2025-01-10".parse()?,
//!         return_date: "2025-01-13".parse()?,
//!         confirmation_number: None,
//!     })
//!     .await?;
//!
//! println!("{} for {} days", receipt.confirmation_number, receipt.number_of_days);
//! ```

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod core;
pub mod rental;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AdminSession, ChangeAction, ChangeEvent, CustomerSession, Document, DocumentStore,
        ErrorKind, EventBus, FieldValue, HeaderSessionProvider, Query, SessionProvider,
        SortDirection, StoreError, VelocityError,
    };

    // === Domain ===
    pub use crate::adapters::{AdminConsole, BookingDesk, DashboardStats, TripRequest};
    pub use crate::catalog::{NewVehicle, Vehicle, VehicleCatalog, VehiclePatch};
    pub use crate::rental::{
        BookingRequest, Quote, Receipt, Rental, RentalLedger, RentalStats, RentalStatus,
        RentalSubscription, SubscriptionHandle,
    };

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::InMemoryDocumentStore;

    // === Config ===
    pub use crate::config::{LedgerConfig, VelocityConfig};

    // === Server ===
    pub use crate::server::{AppHost, ServerBuilder};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use futures::StreamExt;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
    pub use uuid::Uuid;
}
