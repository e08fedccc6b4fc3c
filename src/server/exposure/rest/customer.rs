//! Customer routes, backed by [`BookingDesk`]

use crate::adapters::{BookingDesk, TripRequest};
use crate::core::error::VelocityError;
use crate::rental::{Quote, Receipt, Rental};
use crate::server::host::AppHost;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use uuid::Uuid;

pub fn routes(host: Arc<AppHost>) -> Router {
    Router::new()
        .route("/rentals", post(book))
        .route("/rentals/quote", post(quote))
        .route("/rentals/confirmation/{code}", get(receipt))
        .route("/me/rentals", get(my_rentals))
        .route("/me/rentals/{id}/cancel", post(cancel))
        .with_state(host)
}

/// POST /rentals
async fn book(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Json(trip): Json<TripRequest>,
) -> Result<(StatusCode, Json<Receipt>), VelocityError> {
    let session = host.sessions.customer_session(&headers).await?;
    let receipt = BookingDesk::new(&host.ledger, &session).book(trip).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /rentals/quote
async fn quote(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Json(trip): Json<TripRequest>,
) -> Result<Json<Quote>, VelocityError> {
    let session = host.sessions.customer_session(&headers).await?;
    Ok(Json(BookingDesk::new(&host.ledger, &session).quote(&trip).await?))
}

/// GET /rentals/confirmation/{code}
async fn receipt(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Result<Json<Receipt>, VelocityError> {
    let session = host.sessions.customer_session(&headers).await?;
    Ok(Json(BookingDesk::new(&host.ledger, &session).receipt(&code).await?))
}

/// GET /me/rentals
async fn my_rentals(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Rental>>, VelocityError> {
    let session = host.sessions.customer_session(&headers).await?;
    Ok(Json(BookingDesk::new(&host.ledger, &session).my_rentals().await?))
}

/// POST /me/rentals/{id}/cancel
async fn cancel(
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Rental>, VelocityError> {
    let session = host.sessions.customer_session(&headers).await?;
    Ok(Json(BookingDesk::new(&host.ledger, &session).cancel(&id).await?))
}
