//! Admin console routes, backed by [`AdminConsole`]

use crate::adapters::{AdminConsole, DashboardStats};
use crate::catalog::{NewVehicle, Vehicle, VehiclePatch};
use crate::core::error::VelocityError;
use crate::rental::{Rental, RentalStats, RentalStatus};
use crate::server::host::AppHost;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct RentalFilter {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: RentalStatus,
}

pub fn routes(host: Arc<AppHost>) -> Router {
    Router::new()
        .route("/admin/dashboard", get(dashboard))
        .route("/admin/rentals", get(list_rentals))
        .route("/admin/rentals/stats", get(rental_stats))
        .route("/admin/rentals/{id}", axum::routing::delete(delete_rental))
        .route("/admin/rentals/{id}/status", put(set_status))
        .route("/admin/rentals/{id}/approve", post(approve))
        .route("/admin/rentals/{id}/complete", post(complete))
        .route("/admin/rentals/{id}/cancel", post(cancel))
        .route("/admin/vehicles", get(list_vehicles).post(create_vehicle))
        .route(
            "/admin/vehicles/{id}",
            patch(update_vehicle).delete(delete_vehicle),
        )
        .with_state(host)
}

/// GET /admin/dashboard
async fn dashboard(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
) -> Result<Json<DashboardStats>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    Ok(Json(AdminConsole::new(&host.ledger, &session).dashboard().await?))
}

/// GET /admin/rentals[?status=pending]
async fn list_rentals(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Query(filter): Query<RentalFilter>,
) -> Result<Json<Vec<Rental>>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    let status = match filter.status.as_deref() {
        None | Some("") | Some("all") => None,
        Some(s) => Some(s.parse::<RentalStatus>()?),
    };
    Ok(Json(AdminConsole::new(&host.ledger, &session).rentals(status).await?))
}

/// GET /admin/rentals/stats
async fn rental_stats(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
) -> Result<Json<RentalStats>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    Ok(Json(AdminConsole::new(&host.ledger, &session).rental_stats().await?))
}

/// PUT /admin/rentals/{id}/status
async fn set_status(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(change): Json<StatusChange>,
) -> Result<Json<Rental>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    let console = AdminConsole::new(&host.ledger, &session);
    Ok(Json(console.set_status(&id, change.status).await?))
}

/// POST /admin/rentals/{id}/approve
async fn approve(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Rental>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    Ok(Json(AdminConsole::new(&host.ledger, &session).approve(&id).await?))
}

/// POST /admin/rentals/{id}/complete
async fn complete(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Rental>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    Ok(Json(AdminConsole::new(&host.ledger, &session).complete(&id).await?))
}

/// POST /admin/rentals/{id}/cancel
async fn cancel(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Rental>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    Ok(Json(AdminConsole::new(&host.ledger, &session).cancel(&id).await?))
}

/// DELETE /admin/rentals/{id}
async fn delete_rental(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    AdminConsole::new(&host.ledger, &session).delete_rental(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/vehicles
async fn list_vehicles(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Vehicle>>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    Ok(Json(AdminConsole::new(&host.ledger, &session).vehicles().await?))
}

/// POST /admin/vehicles
async fn create_vehicle(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Json(input): Json<NewVehicle>,
) -> Result<(StatusCode, Json<Vehicle>), VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    let vehicle = AdminConsole::new(&host.ledger, &session)
        .create_vehicle(input)
        .await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// PATCH /admin/vehicles/{id}
async fn update_vehicle(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<VehiclePatch>,
) -> Result<Json<Vehicle>, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    let console = AdminConsole::new(&host.ledger, &session);
    Ok(Json(console.update_vehicle(&id, patch).await?))
}

/// DELETE /admin/vehicles/{id}
async fn delete_vehicle(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, VelocityError> {
    let session = host.sessions.admin_session(&headers).await?;
    AdminConsole::new(&host.ledger, &session).delete_vehicle(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
