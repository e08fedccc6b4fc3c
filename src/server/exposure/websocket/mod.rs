//! WebSocket exposure: live rental lists for signed-in customers
//!
//! # Architecture
//!
//! ```text
//! Client ──ws──▶ /me/rentals/live ──▶ live_rentals_handler() ──▶ RentalSubscription
//!                                                                    │
//!                     rentals store ──watch──▶ re-query ──▶ {"type":"rentals",...} ──▶ Client
//! ```
//!
//! See [`protocol`] for the message shapes.

mod handler;
pub mod protocol;

use crate::server::host::AppHost;
use anyhow::Result;
use axum::{Router, routing::get};
use std::sync::Arc;

pub struct WebSocketExposure;

impl WebSocketExposure {
    /// Build the router exposing `/me/rentals/live`
    pub fn build_router(host: Arc<AppHost>) -> Result<Router> {
        let router = Router::new()
            .route("/me/rentals/live", get(handler::live_rentals_handler))
            .with_state(host);

        Ok(router)
    }
}
