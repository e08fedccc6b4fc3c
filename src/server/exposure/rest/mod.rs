//! REST exposure
//!
//! Routes are grouped by audience:
//!
//! - public: health and vehicle listings ([`vehicles`])
//! - customer: booking, own rentals, receipts ([`customer`])
//! - admin: rental transactions, dashboard, catalog edits ([`admin`])
//!
//! Customer and admin handlers resolve their session from request headers
//! through the host's `SessionProvider`; a missing session is a 401.

pub mod admin;
pub mod customer;
pub mod vehicles;

use crate::server::host::AppHost;
use anyhow::Result;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;

pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host, merging `custom_routes` in
    pub fn build_router(host: Arc<AppHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes()
            .merge(vehicles::routes(host.clone()))
            .merge(customer::routes(host.clone()))
            .merge(admin::routes(host));

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": "velocity-rentals"
        }))
    }
}
