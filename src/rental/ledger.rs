//! The rental ledger: creation, status transitions and derived availability

use crate::catalog::{Vehicle, VehicleCatalog};
use crate::config::LedgerConfig;
use crate::core::document::Document;
use crate::core::error::{Result, VelocityError};
use crate::core::query::{Query, SortDirection};
use crate::core::store::{DocumentStore, StoreError};
use crate::rental::confirmation::ConfirmationGenerator;
use crate::rental::model::{BookingRequest, Rental, RentalStats, RentalStatus};
use crate::rental::pricing::Quote;
use crate::rental::subscription::{RentalSubscription, SubscriptionHandle};
use chrono::{NaiveDate, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

/// Vehicle fields copied into a rental at booking time
#[derive(Debug, Clone, PartialEq)]
struct VehicleSnapshot {
    name: String,
    image: String,
    vehicle_type: String,
    daily_rate: u64,
}

impl VehicleSnapshot {
    fn of(vehicle: &Vehicle) -> Self {
        Self {
            name: vehicle.name.clone(),
            image: vehicle.image.clone(),
            vehicle_type: vehicle.vehicle_type.clone(),
            daily_rate: vehicle.price,
        }
    }

    /// Used when the catalog lookup fails; the booking still goes through
    fn placeholder() -> Self {
        Self {
            name: "Unknown Vehicle".to_string(),
            image: String::new(),
            vehicle_type: "Vehicle".to_string(),
            daily_rate: 0,
        }
    }
}

/// Owns the rental lifecycle
///
/// Every operation is a round-trip to the rentals store. Write paths
/// propagate store failures; [`list_available_vehicles`] degrades instead.
///
/// [`list_available_vehicles`]: RentalLedger::list_available_vehicles
#[derive(Clone)]
pub struct RentalLedger {
    rentals: Arc<dyn DocumentStore<Rental>>,
    catalog: VehicleCatalog,
    config: LedgerConfig,
    confirmations: ConfirmationGenerator,
}

impl RentalLedger {
    pub fn new(
        rentals: Arc<dyn DocumentStore<Rental>>,
        catalog: VehicleCatalog,
        config: LedgerConfig,
    ) -> Self {
        let confirmations = ConfirmationGenerator::new(config.confirmation_prefix.clone());
        Self {
            rentals,
            catalog,
            config,
            confirmations,
        }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Create a rental and return its confirmation number
    pub async fn create_rental(&self, request: BookingRequest) -> Result<String> {
        self.book(request).await.map(|r| r.confirmation_number)
    }

    /// Create a rental in `pending` and return the stored record
    pub async fn book(&self, request: BookingRequest) -> Result<Rental> {
        let now = Utc::now();
        let request = request.trimmed();
        request.check(now.date_naive(), self.config.reject_past_pickup)?;

        let snapshot = self.snapshot(&request.vehicle_id).await;
        let quote = Quote::compute(snapshot.daily_rate, request.pickup_date, request.return_date);
        let supplied = supplied_confirmation(request.confirmation_number.as_deref())?;

        let rental = Rental {
            id: Uuid::nil(),
            confirmation_number: String::new(),
            vehicle_id: request.vehicle_id,
            vehicle_name: snapshot.name,
            vehicle_image: snapshot.image,
            vehicle_type: snapshot.vehicle_type,
            daily_rate: snapshot.daily_rate,
            user_id: request.user_id,
            customer_name: request.customer_name,
            customer_email: request.customer_email,
            customer_phone: request.customer_phone,
            pickup_date: request.pickup_date,
            return_date: request.return_date,
            number_of_days: quote.number_of_days,
            subtotal: quote.subtotal,
            total_amount: quote.total_amount,
            status: RentalStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let rental = self.insert_guarded(rental, supplied).await?;

        tracing::info!(
            rental_id = %rental.id,
            vehicle_id = %rental.vehicle_id,
            user_id = %rental.user_id,
            confirmation = %rental.confirmation_number,
            days = rental.number_of_days,
            total = rental.total_amount,
            "rental created"
        );
        Ok(rental)
    }

    /// Price a trip on a vehicle without booking it
    pub async fn quote(
        &self,
        vehicle_id: &Uuid,
        pickup: NaiveDate,
        return_date: NaiveDate,
    ) -> Result<Quote> {
        if return_date <= pickup {
            return Err(VelocityError::validation(
                "returnDate",
                "return date must be after pickup date",
            ));
        }
        let vehicle = self.catalog.get(vehicle_id).await?;
        Ok(Quote::compute(vehicle.price, pickup, return_date))
    }

    /// Move a rental to `next`.
    ///
    /// The write is conditional on the status read just before it. If another
    /// writer got there first, the result is `InvalidTransition` from the
    /// status that writer left behind.
    pub async fn set_status(&self, id: &Uuid, next: RentalStatus) -> Result<Rental> {
        let current = self.get_rental(id).await?;
        let from = current.status;
        if !from.can_transition_to(next) {
            return Err(VelocityError::InvalidTransition {
                rental_id: *id,
                from,
                to: next,
            });
        }

        let mut updated = current;
        updated.status = next;
        updated.updated_at = Utc::now();

        let precondition = Query::new().filter_eq("status", from);
        let rental = match self.rentals.replace_if(id, updated, &precondition).await {
            Ok(rental) => rental,
            Err(StoreError::Conflict { .. }) => {
                let latest = self.get_rental(id).await?;
                tracing::warn!(
                    rental_id = %id,
                    expected = %from,
                    actual = %latest.status,
                    "status changed concurrently"
                );
                return Err(VelocityError::InvalidTransition {
                    rental_id: *id,
                    from: latest.status,
                    to: next,
                });
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(rental_id = %id, from = %from, to = %next, "rental status changed");
        Ok(rental)
    }

    pub async fn approve(&self, id: &Uuid) -> Result<Rental> {
        self.set_status(id, RentalStatus::Active).await
    }

    pub async fn complete(&self, id: &Uuid) -> Result<Rental> {
        self.set_status(id, RentalStatus::Completed).await
    }

    pub async fn cancel(&self, id: &Uuid) -> Result<Rental> {
        self.set_status(id, RentalStatus::Cancelled).await
    }

    /// Hard delete, regardless of status
    pub async fn delete_rental(&self, id: &Uuid) -> Result<()> {
        self.rentals.delete(id).await?;
        tracing::info!(rental_id = %id, "rental deleted");
        Ok(())
    }

    pub async fn get_rental(&self, id: &Uuid) -> Result<Rental> {
        self.rentals
            .get(id)
            .await?
            .ok_or_else(|| VelocityError::not_found(Rental::collection(), id))
    }

    pub async fn find_by_confirmation(&self, code: &str) -> Result<Option<Rental>> {
        let query = Query::new().filter_eq("confirmationNumber", code.trim());
        Ok(self.rentals.query(&query).await?.into_iter().next())
    }

    /// Vehicles that are listed and have no pending or active rental.
    ///
    /// If the rentals cannot be read, every listed vehicle is returned.
    pub async fn list_available_vehicles(&self) -> Result<Vec<Vehicle>> {
        let vehicles = self.catalog.list().await?;

        let occupied: HashSet<Uuid> = match self.rentals.query(&open_rentals()).await {
            Ok(rentals) => rentals.into_iter().map(|r| r.vehicle_id).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "could not read rentals, listing all vehicles");
                HashSet::new()
            }
        };

        Ok(vehicles
            .into_iter()
            .filter(|v| v.is_listed() && !occupied.contains(&v.id))
            .collect())
    }

    /// All rentals, optionally of one status, newest first
    pub async fn list_rentals(&self, status: Option<RentalStatus>) -> Result<Vec<Rental>> {
        let mut query = Query::new().order_by("createdAt", SortDirection::Descending);
        if let Some(status) = status {
            query = query.filter_eq("status", status);
        }
        Ok(newest_first(self.rentals.as_ref(), &query).await?)
    }

    pub async fn stats(&self) -> Result<RentalStats> {
        let rentals = self.rentals.list().await?;
        Ok(RentalStats::tally(&rentals))
    }

    /// The user's rentals, newest first
    pub async fn user_rentals(&self, user_id: &str) -> Result<Vec<Rental>> {
        let query = Query::new()
            .filter_eq("userId", user_id)
            .order_by("createdAt", SortDirection::Descending);
        Ok(newest_first(self.rentals.as_ref(), &query).await?)
    }

    /// Live view of the user's rentals, newest first
    pub fn subscribe_to_user_rentals(&self, user_id: &str) -> RentalSubscription {
        RentalSubscription::spawn(self.rentals.clone(), user_id.to_string())
    }

    /// Invoke `callback` with the user's full rental list on every change.
    /// Dropping or cancelling the handle stops the callbacks.
    pub fn watch_user_rentals<F>(&self, user_id: &str, callback: F) -> SubscriptionHandle
    where
        F: FnMut(Vec<Rental>) + Send + 'static,
    {
        SubscriptionHandle::forward(self.subscribe_to_user_rentals(user_id), callback)
    }

    async fn snapshot(&self, vehicle_id: &Uuid) -> VehicleSnapshot {
        match self.catalog.get(vehicle_id).await {
            Ok(vehicle) => VehicleSnapshot::of(&vehicle),
            Err(e) => {
                tracing::warn!(vehicle_id = %vehicle_id, error = %e, "vehicle lookup failed, using placeholder snapshot");
                VehicleSnapshot::placeholder()
            }
        }
    }

    /// Store a new rental under a confirmation number no other rental carries.
    ///
    /// Uniqueness of the code and, when enforced, exclusive occupancy of the
    /// vehicle are checked in the same atomic write. A generated code that is
    /// taken is regenerated; a supplied one is a validation error.
    async fn insert_guarded(&self, mut rental: Rental, supplied: Option<String>) -> Result<Rental> {
        let vehicle_id = rental.vehicle_id;
        let attempts = match supplied {
            Some(_) => 1,
            None => self.config.max_confirmation_attempts.max(1),
        };

        for _ in 0..attempts {
            let code = match &supplied {
                Some(code) => code.clone(),
                None => self.confirmations.generate(Utc::now()),
            };

            let mut guards = vec![Query::new().filter_eq("confirmationNumber", code.as_str())];
            if self.config.enforce_exclusive_occupancy {
                guards.push(open_rentals().filter_eq("vehicleId", vehicle_id));
            }

            rental.confirmation_number = code;
            match self.rentals.insert_unless(rental.clone(), &guards).await {
                Ok(stored) => return Ok(stored),
                Err(StoreError::GuardMatched {
                    guard: CONFIRMATION_GUARD,
                    ..
                }) => {
                    if supplied.is_some() {
                        return Err(VelocityError::validation(
                            "confirmationNumber",
                            format!(
                                "confirmation number {} is already in use",
                                rental.confirmation_number
                            ),
                        ));
                    }
                    tracing::debug!(
                        confirmation = %rental.confirmation_number,
                        "confirmation number collision, regenerating"
                    );
                }
                Err(StoreError::GuardMatched { .. }) => {
                    return Err(VelocityError::VehicleUnavailable { vehicle_id });
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(VelocityError::ConfirmationExhausted { attempts })
    }
}

/// Index of the confirmation-number guard passed to `insert_unless`
const CONFIRMATION_GUARD: usize = 0;

/// A caller-supplied confirmation number, trimmed; blank is rejected
fn supplied_confirmation(supplied: Option<&str>) -> Result<Option<String>> {
    match supplied.map(str::trim) {
        Some("") => Err(VelocityError::validation(
            "confirmationNumber",
            "confirmation number cannot be empty",
        )),
        other => Ok(other.map(str::to_string)),
    }
}

fn open_rentals() -> Query {
    Query::new().filter_in("status", RentalStatus::OPEN)
}

/// Run an ordered query, falling back to an unordered one sorted in memory
/// when the store cannot serve the ordering.
pub(crate) async fn newest_first(
    store: &dyn DocumentStore<Rental>,
    query: &Query,
) -> std::result::Result<Vec<Rental>, StoreError> {
    match store.query(query).await {
        Err(StoreError::FailedPrecondition(reason)) if query.order_by.is_some() => {
            tracing::warn!(reason = %reason, "ordered rental query refused, sorting in memory");
            let rentals = store.query(&query.unordered()).await?;
            Ok(match &query.order_by {
                Some(order) => Query::sort(rentals, order),
                None => rentals,
            })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewVehicle;
    use crate::core::error::ErrorKind;
    use crate::core::session::CustomerSession;
    use crate::storage::InMemoryDocumentStore;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    async fn ledger_with_vehicle(price: u64) -> (RentalLedger, Vehicle) {
        let catalog = VehicleCatalog::new(Arc::new(InMemoryDocumentStore::<Vehicle>::new()));
        let vehicle = catalog
            .create(NewVehicle {
                name: "Toyota Vios".to_string(),
                vehicle_type: "sedan".to_string(),
                price,
                image: String::new(),
                rating: 4.5,
                description: String::new(),
                available: true,
            })
            .await
            .unwrap();
        let ledger = RentalLedger::new(
            Arc::new(InMemoryDocumentStore::<Rental>::new()),
            catalog,
            LedgerConfig::default(),
        );
        (ledger, vehicle)
    }

    fn request(vehicle_id: Uuid) -> BookingRequest {
        let session = CustomerSession::new("uid-1", "Maria Santos", "maria@example.com", "09175550101");
        BookingRequest::for_customer(&session, vehicle_id, date("2025-01-10"), date("2025-01-13"))
    }

    #[tokio::test]
    async fn test_book_computes_amounts() {
        let (ledger, vehicle) = ledger_with_vehicle(100).await;
        let rental = ledger.book(request(vehicle.id)).await.unwrap();

        assert_eq!(rental.number_of_days, 3);
        assert_eq!(rental.subtotal, 300);
        assert_eq!(rental.total_amount, 300);
        assert_eq!(rental.status, RentalStatus::Pending);
        assert_eq!(rental.created_at, rental.updated_at);
        assert!(rental.confirmation_number.starts_with("VR"));
    }

    #[tokio::test]
    async fn test_unknown_vehicle_uses_placeholder() {
        let (ledger, _) = ledger_with_vehicle(100).await;
        let rental = ledger.book(request(Uuid::new_v4())).await.unwrap();

        assert_eq!(rental.vehicle_name, "Unknown Vehicle");
        assert_eq!(rental.vehicle_type, "Vehicle");
        assert_eq!(rental.daily_rate, 0);
        assert_eq!(rental.total_amount, 0);
    }

    #[tokio::test]
    async fn test_set_status_bumps_updated_at() {
        let (ledger, vehicle) = ledger_with_vehicle(100).await;
        let rental = ledger.book(request(vehicle.id)).await.unwrap();

        let approved = ledger.approve(&rental.id).await.unwrap();
        assert_eq!(approved.status, RentalStatus::Active);
        assert!(approved.updated_at >= rental.updated_at);
        assert_eq!(approved.created_at, rental.created_at);
    }

    #[tokio::test]
    async fn test_terminal_status_is_final() {
        let (ledger, vehicle) = ledger_with_vehicle(100).await;
        let rental = ledger.book(request(vehicle.id)).await.unwrap();
        ledger.cancel(&rental.id).await.unwrap();

        let err = ledger.approve(&rental.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[tokio::test]
    async fn test_duplicate_supplied_confirmation_rejected() {
        let (ledger, vehicle) = ledger_with_vehicle(100).await;
        let mut first = request(vehicle.id);
        first.confirmation_number = Some("VR-FIXED".to_string());
        assert_eq!(ledger.create_rental(first).await.unwrap(), "VR-FIXED");

        let mut second = request(Uuid::new_v4());
        second.confirmation_number = Some("VR-FIXED".to_string());
        let err = ledger.book(second).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_blank_customer_name_is_rejected() {
        let (ledger, vehicle) = ledger_with_vehicle(100).await;
        let mut blank = request(vehicle.id);
        blank.customer_name = "   ".to_string();

        let err = ledger.book(blank).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(ledger.list_rentals(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_renter_fields_stored_trimmed() {
        let (ledger, vehicle) = ledger_with_vehicle(100).await;
        let mut padded = request(vehicle.id);
        padded.customer_name = "  Maria Santos  ".to_string();
        padded.customer_email = " maria@example.com ".to_string();

        let rental = ledger.book(padded).await.unwrap();
        assert_eq!(rental.customer_name, "Maria Santos");
        assert_eq!(rental.customer_email, "maria@example.com");
    }

    #[tokio::test]
    async fn test_missing_rental_is_not_found() {
        let (ledger, _) = ledger_with_vehicle(100).await;
        let id = Uuid::new_v4();

        assert_eq!(ledger.approve(&id).await.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(ledger.delete_rental(&id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_quote_uses_catalog_price() {
        let (ledger, vehicle) = ledger_with_vehicle(1500).await;
        let quote = ledger
            .quote(&vehicle.id, date("2025-03-01"), date("2025-03-05"))
            .await
            .unwrap();
        assert_eq!(quote.number_of_days, 4);
        assert_eq!(quote.total_amount, 6000);
    }
}
