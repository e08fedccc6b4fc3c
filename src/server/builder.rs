//! ServerBuilder for wiring stores, sessions and exposures into a router

use super::exposure::RestExposure;
use super::host::AppHost;
use crate::catalog::{Vehicle, VehicleCatalog};
use crate::config::VelocityConfig;
use crate::core::session::{HeaderSessionProvider, SessionProvider};
use crate::core::store::DocumentStore;
use crate::rental::{Rental, RentalLedger};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the rental HTTP server
///
/// Stores default to in-memory ones (feature `in-memory`); sessions default
/// to [`HeaderSessionProvider`].
///
/// # Example
///
/// ```ignore
/// ServerBuilder::new()
///     .with_config(VelocityConfig::from_yaml_file("velocity.yaml")?)
///     .with_vehicle_store(vehicles)
///     .serve("0.0.0.0:8080")
///     .await?;
/// ```
pub struct ServerBuilder {
    config: VelocityConfig,
    rental_store: Option<Arc<dyn DocumentStore<Rental>>>,
    vehicle_store: Option<Arc<dyn DocumentStore<Vehicle>>>,
    sessions: Option<Arc<dyn SessionProvider>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: VelocityConfig::default(),
            rental_store: None,
            vehicle_store: None,
            sessions: None,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: VelocityConfig) -> Self {
        self.config = config;
        self
    }

    /// Store backing the `rentals` collection
    pub fn with_rental_store(mut self, store: impl DocumentStore<Rental> + 'static) -> Self {
        self.rental_store = Some(Arc::new(store));
        self
    }

    /// Store backing the `vehicles` collection
    pub fn with_vehicle_store(mut self, store: impl DocumentStore<Vehicle> + 'static) -> Self {
        self.vehicle_store = Some(Arc::new(store));
        self
    }

    pub fn with_session_provider(mut self, provider: impl SessionProvider + 'static) -> Self {
        self.sessions = Some(Arc::new(provider));
        self
    }

    /// Add routes outside the rental API (webhooks, static pages, ...)
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<AppHost> {
        let rental_store = match self.rental_store.take() {
            Some(store) => store,
            None => self.default_store::<Rental>()?,
        };
        let vehicle_store = match self.vehicle_store.take() {
            Some(store) => store,
            None => self.default_store::<Vehicle>()?,
        };
        let sessions = self
            .sessions
            .take()
            .unwrap_or_else(|| Arc::new(HeaderSessionProvider));

        let catalog = VehicleCatalog::new(vehicle_store)
            .with_image_base_url(self.config.catalog.image_base_url.clone());
        let ledger = RentalLedger::new(rental_store, catalog, self.config.ledger.clone());

        Ok(AppHost::new(self.config, ledger, sessions))
    }

    /// Build the full router: REST, WebSocket (feature `websocket`) and
    /// custom routes, with request tracing and CORS.
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let host = Arc::new(self.build_host()?);
        Self::router_for(host, custom_routes)
    }

    /// Build the router for an existing host
    pub fn router_for(host: Arc<AppHost>, custom_routes: Vec<Router>) -> Result<Router> {
        #[allow(unused_mut)]
        let mut app = RestExposure::build_router(host.clone(), custom_routes)?;

        #[cfg(feature = "websocket")]
        {
            app = app.merge(super::exposure::WebSocketExposure::build_router(host)?);
        }

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    /// Serve on `addr` with graceful shutdown on SIGTERM or Ctrl+C
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Serve on the configured bind address (`VELOCITY_BIND` wins)
    pub async fn serve_configured(self) -> Result<()> {
        let addr = self.config.bind_address();
        self.serve(&addr).await
    }

    #[cfg(feature = "in-memory")]
    fn default_store<T: crate::core::Document>(&self) -> Result<Arc<dyn DocumentStore<T>>> {
        use crate::core::events::EventBus;
        use crate::storage::InMemoryDocumentStore;

        Ok(Arc::new(InMemoryDocumentStore::<T>::with_event_bus(
            EventBus::new(self.config.events.capacity),
        )))
    }

    #[cfg(not(feature = "in-memory"))]
    fn default_store<T: crate::core::Document>(&self) -> Result<Arc<dyn DocumentStore<T>>> {
        Err(anyhow::anyhow!(
            "A {} store is required. Call .with_{}_store() or enable the in-memory feature",
            T::collection(),
            T::collection().trim_end_matches('s')
        ))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryDocumentStore;

    #[test]
    fn test_new_creates_empty_builder() {
        let builder = ServerBuilder::new();
        assert!(builder.rental_store.is_none());
        assert!(builder.vehicle_store.is_none());
        assert!(builder.sessions.is_none());
        assert!(builder.custom_routes.is_empty());
    }

    #[test]
    fn test_with_custom_routes_appends_router() {
        let builder = ServerBuilder::new()
            .with_custom_routes(Router::new())
            .with_custom_routes(Router::new());
        assert_eq!(builder.custom_routes.len(), 2);
    }

    #[test]
    fn test_build_host_uses_config() {
        let mut config = VelocityConfig::default();
        config.ledger.enforce_exclusive_occupancy = false;

        let host = ServerBuilder::new()
            .with_config(config)
            .with_rental_store(InMemoryDocumentStore::<Rental>::new())
            .build_host()
            .expect("build_host should succeed");

        assert!(!host.ledger.config().enforce_exclusive_occupancy);
        assert!(!host.config.ledger.enforce_exclusive_occupancy);
    }

    #[tokio::test]
    async fn test_build_produces_router() {
        let custom = Router::new().route("/custom", axum::routing::get(|| async { "ok" }));
        let router = ServerBuilder::new()
            .with_custom_routes(custom)
            .build()
            .expect("build should produce a Router");
        let _ = router;
    }
}
