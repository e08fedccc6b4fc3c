//! Admin console adapter

use crate::catalog::{NewVehicle, Vehicle, VehiclePatch};
use crate::core::error::Result;
use crate::core::session::AdminSession;
use crate::rental::{Rental, RentalLedger, RentalStats, RentalStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Catalog figures shown on the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStats {
    pub total: usize,
    pub listed: usize,
    pub unlisted: usize,
    /// Rounded mean daily rate, 0 for an empty catalog
    pub average_price: u64,
}

impl VehicleStats {
    pub fn tally(vehicles: &[Vehicle]) -> Self {
        let total = vehicles.len();
        let listed = vehicles.iter().filter(|v| v.is_listed()).count();
        let sum: u128 = vehicles.iter().map(|v| u128::from(v.price)).sum();
        // the mean of u64 prices always fits back into a u64
        let average_price = match total as u128 {
            0 => 0,
            n => u64::try_from((sum + n / 2) / n).unwrap_or(u64::MAX),
        };

        Self {
            total,
            listed,
            unlisted: total - listed,
            average_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub vehicles: VehicleStats,
    pub rentals: RentalStats,
}

/// Console operations for one signed-in admin
pub struct AdminConsole<'a> {
    ledger: &'a RentalLedger,
    session: &'a AdminSession,
}

impl<'a> AdminConsole<'a> {
    pub fn new(ledger: &'a RentalLedger, session: &'a AdminSession) -> Self {
        Self { ledger, session }
    }

    pub fn session(&self) -> &AdminSession {
        self.session
    }

    pub async fn rentals(&self, status: Option<RentalStatus>) -> Result<Vec<Rental>> {
        self.ledger.list_rentals(status).await
    }

    pub async fn rental_stats(&self) -> Result<RentalStats> {
        self.ledger.stats().await
    }

    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let vehicles = self.ledger.catalog().list().await?;
        Ok(DashboardStats {
            vehicles: VehicleStats::tally(&vehicles),
            rentals: self.ledger.stats().await?,
        })
    }

    pub async fn set_status(&self, rental_id: &Uuid, status: RentalStatus) -> Result<Rental> {
        tracing::info!(admin_id = %self.session.admin_id, rental_id = %rental_id, to = %status, "admin status change");
        self.ledger.set_status(rental_id, status).await
    }

    pub async fn approve(&self, rental_id: &Uuid) -> Result<Rental> {
        self.set_status(rental_id, RentalStatus::Active).await
    }

    pub async fn complete(&self, rental_id: &Uuid) -> Result<Rental> {
        self.set_status(rental_id, RentalStatus::Completed).await
    }

    pub async fn cancel(&self, rental_id: &Uuid) -> Result<Rental> {
        self.set_status(rental_id, RentalStatus::Cancelled).await
    }

    pub async fn delete_rental(&self, rental_id: &Uuid) -> Result<()> {
        tracing::info!(admin_id = %self.session.admin_id, rental_id = %rental_id, "admin deleting rental");
        self.ledger.delete_rental(rental_id).await
    }

    pub async fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.ledger.catalog().list().await
    }

    pub async fn create_vehicle(&self, input: NewVehicle) -> Result<Vehicle> {
        self.ledger.catalog().create(input).await
    }

    pub async fn update_vehicle(&self, id: &Uuid, patch: VehiclePatch) -> Result<Vehicle> {
        self.ledger.catalog().update(id, patch).await
    }

    pub async fn delete_vehicle(&self, id: &Uuid) -> Result<()> {
        tracing::info!(admin_id = %self.session.admin_id, vehicle_id = %id, "admin deleting vehicle");
        self.ledger.catalog().delete(id).await
    }
}
