//! Customer-facing adapter (mobile and web booking surfaces)

use crate::catalog::Vehicle;
use crate::core::error::{Result, VelocityError};
use crate::core::session::CustomerSession;
use crate::rental::{BookingRequest, Quote, Receipt, Rental, RentalLedger, RentalSubscription};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trip details entered by the customer; identity comes from the session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRequest {
    pub vehicle_id: Uuid,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,
}

/// Booking operations on behalf of one signed-in customer
pub struct BookingDesk<'a> {
    ledger: &'a RentalLedger,
    session: &'a CustomerSession,
}

impl<'a> BookingDesk<'a> {
    pub fn new(ledger: &'a RentalLedger, session: &'a CustomerSession) -> Self {
        Self { ledger, session }
    }

    pub fn session(&self) -> &CustomerSession {
        self.session
    }

    pub async fn available_vehicles(&self) -> Result<Vec<Vehicle>> {
        self.ledger.list_available_vehicles().await
    }

    pub async fn quote(&self, trip: &TripRequest) -> Result<Quote> {
        self.ledger
            .quote(&trip.vehicle_id, trip.pickup_date, trip.return_date)
            .await
    }

    /// Book the trip for the session's customer
    pub async fn book(&self, trip: TripRequest) -> Result<Receipt> {
        let mut request = BookingRequest::for_customer(
            self.session,
            trip.vehicle_id,
            trip.pickup_date,
            trip.return_date,
        );
        request.confirmation_number = trip.confirmation_number;

        let rental = self.ledger.book(request).await?;
        Ok(Receipt::from(&rental))
    }

    pub async fn my_rentals(&self) -> Result<Vec<Rental>> {
        self.ledger.user_rentals(&self.session.user_id).await
    }

    pub fn watch(&self) -> RentalSubscription {
        self.ledger.subscribe_to_user_rentals(&self.session.user_id)
    }

    /// Receipt for one of the customer's own bookings
    pub async fn receipt(&self, confirmation_number: &str) -> Result<Receipt> {
        let rental = self
            .ledger
            .find_by_confirmation(confirmation_number)
            .await?
            .ok_or_else(|| VelocityError::not_found("rentals", confirmation_number))?;
        self.ensure_owner(&rental)?;
        Ok(Receipt::from(&rental))
    }

    /// Cancel one of the customer's own rentals. Only pending rentals can be
    /// cancelled.
    pub async fn cancel(&self, rental_id: &Uuid) -> Result<Rental> {
        let rental = self.ledger.get_rental(rental_id).await?;
        self.ensure_owner(&rental)?;
        self.ledger.cancel(rental_id).await
    }

    fn ensure_owner(&self, rental: &Rental) -> Result<()> {
        if rental.user_id == self.session.user_id {
            Ok(())
        } else {
            Err(VelocityError::Forbidden(format!(
                "rental {} belongs to another customer",
                rental.confirmation_number
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NewVehicle, VehicleCatalog};
    use crate::config::LedgerConfig;
    use crate::core::error::ErrorKind;
    use crate::storage::InMemoryDocumentStore;
    use futures::StreamExt;
    use std::sync::Arc;

    async fn ledger_with_vehicle() -> (RentalLedger, Vehicle) {
        let catalog = VehicleCatalog::new(Arc::new(InMemoryDocumentStore::<Vehicle>::new()));
        let vehicle = catalog
            .create(NewVehicle {
                name: "Honda City".to_string(),
                vehicle_type: "sedan".to_string(),
                price: 1600,
                image: String::new(),
                rating: 4.4,
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

    fn session(user_id: &str) -> CustomerSession {
        CustomerSession::new(user_id, "Juan Cruz", "juan@example.com", "0917 555 0199")
    }

    fn trip(vehicle_id: Uuid) -> TripRequest {
        TripRequest {
            vehicle_id,
            pickup_date: "2025-07-01".parse().unwrap(),
            return_date: "2025-07-03".parse().unwrap(),
            confirmation_number: None,
        }
    }

    #[tokio::test]
    async fn test_book_uses_session_identity() {
        let (ledger, vehicle) = ledger_with_vehicle().await;
        let me = session("uid-9");
        let desk = BookingDesk::new(&ledger, &me);

        let receipt = desk.book(trip(vehicle.id)).await.unwrap();
        assert_eq!(receipt.customer_name, "Juan Cruz");
        assert_eq!(receipt.total_amount, 3200);

        let mine = desk.my_rentals().await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "uid-9");
        assert!(desk.available_vehicles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_customer_cannot_touch_rental() {
        let (ledger, vehicle) = ledger_with_vehicle().await;
        let owner = session("uid-1");
        let receipt = BookingDesk::new(&ledger, &owner)
            .book(trip(vehicle.id))
            .await
            .unwrap();
        let rental = ledger
            .find_by_confirmation(&receipt.confirmation_number)
            .await
            .unwrap()
            .unwrap();

        let intruder = session("uid-2");
        let desk = BookingDesk::new(&ledger, &intruder);
        let err = desk.receipt(&receipt.confirmation_number).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        let err = desk.cancel(&rental.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let cancelled = BookingDesk::new(&ledger, &owner).cancel(&rental.id).await.unwrap();
        assert_eq!(cancelled.status, crate::rental::RentalStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_watch_follows_session_user() {
        let (ledger, vehicle) = ledger_with_vehicle().await;
        let me = session("uid-3");
        let desk = BookingDesk::new(&ledger, &me);

        let mut live = desk.watch();
        assert_eq!(live.user_id(), "uid-3");
        assert!(live.next().await.unwrap().unwrap().is_empty());

        desk.book(trip(vehicle.id)).await.unwrap();
        assert_eq!(live.next().await.unwrap().unwrap().len(), 1);
    }
}
