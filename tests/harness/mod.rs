//! Shared fixtures for the integration suites
//!
//! - [`Fixture`]: a ledger over in-memory stores, with direct store handles
//! - [`FaultyStore`]: wraps an in-memory store and injects store failures
//!   (unavailable reads/writes, refused orderings) on demand

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use uuid::Uuid;
use velocity::catalog::{NewVehicle, Vehicle, VehicleCatalog};
use velocity::config::LedgerConfig;
use velocity::core::events::EventEnvelope;
use velocity::core::query::Query;
use velocity::core::session::CustomerSession;
use velocity::core::store::{DocumentStore, StoreError};
use velocity::core::Document;
use velocity::rental::{BookingRequest, Rental, RentalLedger};
use velocity::storage::InMemoryDocumentStore;

pub fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid date")
}

pub fn customer(user_id: &str) -> CustomerSession {
    CustomerSession::new(
        user_id,
        format!("Customer {}", user_id),
        format!("{}@example.com", user_id),
        "+63 917 555 0101",
    )
}

pub fn new_vehicle(name: &str, vehicle_type: &str, price: u64) -> NewVehicle {
    NewVehicle {
        name: name.to_string(),
        vehicle_type: vehicle_type.to_string(),
        price,
        image: format!("/images/{}.png", name),
        rating: 4.5,
        description: format!("{} for rent", name),
        available: true,
    }
}

pub fn booking(user_id: &str, vehicle_id: Uuid, pickup: &str, return_date: &str) -> BookingRequest {
    BookingRequest::for_customer(&customer(user_id), vehicle_id, date(pickup), date(return_date))
}

/// Store wrapper that fails on demand
pub struct FaultyStore<T: Document> {
    inner: InMemoryDocumentStore<T>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    refuse_ordering: AtomicBool,
}

impl<T: Document> FaultyStore<T> {
    pub fn new(inner: InMemoryDocumentStore<T>) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            refuse_ordering: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemoryDocumentStore<T> {
        &self.inner
    }

    /// `get` and `query` fail with PermissionDenied
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Every write fails with Unavailable
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Ordered queries fail with FailedPrecondition, as with a missing index
    pub fn set_refuse_ordering(&self, refuse: bool) {
        self.refuse_ordering.store(refuse, Ordering::SeqCst);
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            Err(StoreError::PermissionDenied(format!(
                "Missing or insufficient permissions on {}",
                T::collection()
            )))
        } else {
            Ok(())
        }
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("backend unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<T: Document> DocumentStore<T> for FaultyStore<T> {
    async fn insert(&self, doc: T) -> Result<T, StoreError> {
        self.check_write()?;
        self.inner.insert(doc).await
    }

    async fn insert_unless(&self, doc: T, guards: &[Query]) -> Result<T, StoreError> {
        self.check_write()?;
        self.inner.insert_unless(doc, guards).await
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>, StoreError> {
        self.check_read()?;
        self.inner.get(id).await
    }

    async fn query(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        self.check_read()?;
        if query.order_by.is_some() && self.refuse_ordering.load(Ordering::SeqCst) {
            return Err(StoreError::FailedPrecondition(
                "The query requires an index".to_string(),
            ));
        }
        self.inner.query(query).await
    }

    async fn replace(&self, id: &Uuid, doc: T) -> Result<T, StoreError> {
        self.check_write()?;
        self.inner.replace(id, doc).await
    }

    async fn replace_if(&self, id: &Uuid, doc: T, precondition: &Query) -> Result<T, StoreError> {
        self.check_write()?;
        self.inner.replace_if(id, doc, precondition).await
    }

    async fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        self.check_write()?;
        self.inner.delete(id).await
    }

    fn watch(&self) -> broadcast::Receiver<EventEnvelope> {
        self.inner.watch()
    }
}

/// A ledger wired to fault-injectable stores
pub struct Fixture {
    pub ledger: RentalLedger,
    pub rentals: Arc<FaultyStore<Rental>>,
    pub vehicles: Arc<FaultyStore<Vehicle>>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(LedgerConfig::default())
    }

    pub fn with_config(config: LedgerConfig) -> Self {
        let rentals = Arc::new(FaultyStore::new(InMemoryDocumentStore::<Rental>::new()));
        let vehicles = Arc::new(FaultyStore::new(InMemoryDocumentStore::<Vehicle>::new()));
        let catalog = VehicleCatalog::new(vehicles.clone());
        let ledger = RentalLedger::new(rentals.clone(), catalog, config);
        Self {
            ledger,
            rentals,
            vehicles,
        }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        self.ledger.catalog()
    }

    pub async fn add_vehicle(&self, name: &str, price: u64) -> Vehicle {
        self.catalog()
            .create(new_vehicle(name, "sedan", price))
            .await
            .expect("vehicle created")
    }

    /// Book `vehicle` for `user_id` over the default trip (2025-01-10 to 2025-01-13)
    pub async fn book(&self, user_id: &str, vehicle: &Vehicle) -> Rental {
        self.ledger
            .book(booking(user_id, vehicle.id, "2025-01-10", "2025-01-13"))
            .await
            .expect("booking succeeds")
    }
}
