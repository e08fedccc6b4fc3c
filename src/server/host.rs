//! Application host shared by every exposure
//!
//! The host is transport-agnostic: REST and WebSocket exposures both take an
//! `Arc<AppHost>` and reach the ledger, the catalog and the session provider
//! through it.

use crate::catalog::VehicleCatalog;
use crate::config::VelocityConfig;
use crate::core::session::SessionProvider;
use crate::rental::RentalLedger;
use std::sync::Arc;

pub struct AppHost {
    /// Loaded configuration
    pub config: Arc<VelocityConfig>,

    /// The rental ledger (owns the catalog handle too)
    pub ledger: RentalLedger,

    /// Resolves customer and admin sessions from request headers
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppHost {
    pub fn new(
        config: VelocityConfig,
        ledger: RentalLedger,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            ledger,
            sessions,
        }
    }

    pub fn catalog(&self) -> &VehicleCatalog {
        self.ledger.catalog()
    }
}
