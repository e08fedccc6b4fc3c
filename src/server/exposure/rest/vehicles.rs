//! Public vehicle listings

use crate::catalog::Vehicle;
use crate::core::error::VelocityError;
use crate::server::host::AppHost;
use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct VehicleFilter {
    #[serde(rename = "type")]
    pub vehicle_type: Option<String>,
}

pub fn routes(host: Arc<AppHost>) -> Router {
    Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles/available", get(available_vehicles))
        .route("/vehicles/{id}", get(get_vehicle))
        .with_state(host)
}

/// GET /vehicles[?type=suv]
async fn list_vehicles(
    State(host): State<Arc<AppHost>>,
    Query(filter): Query<VehicleFilter>,
) -> Result<Json<Vec<Vehicle>>, VelocityError> {
    let vehicles = match filter.vehicle_type.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(vehicle_type) => host.catalog().list_by_type(vehicle_type).await?,
        None => host.catalog().list().await?,
    };
    Ok(Json(vehicles))
}

/// GET /vehicles/available
async fn available_vehicles(
    State(host): State<Arc<AppHost>>,
) -> Result<Json<Vec<Vehicle>>, VelocityError> {
    Ok(Json(host.ledger.list_available_vehicles().await?))
}

/// GET /vehicles/{id}
async fn get_vehicle(
    State(host): State<Arc<AppHost>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, VelocityError> {
    Ok(Json(host.catalog().get(&id).await?))
}
