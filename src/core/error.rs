//! Typed error handling for the rental system
//!
//! [`VelocityError`] is what every ledger, catalog and adapter operation
//! returns. Each variant belongs to one [`ErrorKind`], which drives both the
//! propagation policy and the HTTP mapping:
//!
//! - `Validation`, `InvalidTransition` and `Conflict` are caller-facing and are
//!   surfaced verbatim.
//! - `Transport` is fatal on write paths; read paths that can degrade (the
//!   availability listing) handle it before it reaches the caller.
//!
//! ```rust,ignore
//! match ledger.set_status(&id, RentalStatus::Active).await {
//!     Ok(rental) => println!("approved {}", rental.confirmation_number),
//!     Err(e) if e.kind() == ErrorKind::InvalidTransition => println!("already closed"),
//!     Err(e) => eprintln!("retry later: {}", e),
//! }
//! ```

use crate::core::store::StoreError;
use crate::rental::model::RentalStatus;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Coarse classification of a [`VelocityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidTransition,
    Validation,
    Conflict,
    Unauthorized,
    Forbidden,
    Transport,
}

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum VelocityError {
    /// Operation referenced a rental or vehicle id that does not exist
    #[error("{collection} '{id}' not found")]
    NotFound { collection: String, id: String },

    /// Status change from a terminal state or to a non-adjacent state
    #[error("rental '{rental_id}' cannot move from {from} to {to}")]
    InvalidTransition {
        rental_id: Uuid,
        from: RentalStatus,
        to: RentalStatus,
    },

    /// Malformed input
    #[error("validation failed: {}", format_fields(.0))]
    Validation(Vec<FieldError>),

    /// The vehicle already has an open (pending or active) rental
    #[error("vehicle '{vehicle_id}' already has an open rental")]
    VehicleUnavailable { vehicle_id: Uuid },

    /// No unused confirmation number could be generated
    #[error("could not allocate a unique confirmation number after {attempts} attempts")]
    ConfirmationExhausted { attempts: u32 },

    /// No usable session was presented
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The session may not act on this resource
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The backing store failed
    #[error("transport error: {0}")]
    Transport(StoreError),
}

fn format_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error response body for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl VelocityError {
    /// Shorthand for a single-field validation error
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        VelocityError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.into(),
        }])
    }

    /// Shorthand for a missing document
    pub fn not_found(collection: &str, id: impl ToString) -> Self {
        VelocityError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            VelocityError::NotFound { .. } => ErrorKind::NotFound,
            VelocityError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            VelocityError::Validation(_) => ErrorKind::Validation,
            VelocityError::VehicleUnavailable { .. }
            | VelocityError::ConfirmationExhausted { .. } => ErrorKind::Conflict,
            VelocityError::Unauthorized(_) => ErrorKind::Unauthorized,
            VelocityError::Forbidden(_) => ErrorKind::Forbidden,
            VelocityError::Transport(_) => ErrorKind::Transport,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidTransition | ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Transport => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            VelocityError::NotFound { .. } => "NOT_FOUND",
            VelocityError::InvalidTransition { .. } => "INVALID_TRANSITION",
            VelocityError::Validation(_) => "VALIDATION_ERROR",
            VelocityError::VehicleUnavailable { .. } => "VEHICLE_UNAVAILABLE",
            VelocityError::ConfirmationExhausted { .. } => "CONFIRMATION_EXHAUSTED",
            VelocityError::Unauthorized(_) => "UNAUTHORIZED",
            VelocityError::Forbidden(_) => "FORBIDDEN",
            VelocityError::Transport(_) => "TRANSPORT_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            VelocityError::NotFound { collection, id } => Some(serde_json::json!({
                "collection": collection,
                "id": id,
            })),
            VelocityError::InvalidTransition { rental_id, from, to } => Some(serde_json::json!({
                "rental_id": rental_id.to_string(),
                "from": from,
                "to": to,
            })),
            VelocityError::Validation(errors) => Some(serde_json::json!({ "fields": errors })),
            VelocityError::VehicleUnavailable { vehicle_id } => Some(serde_json::json!({
                "vehicle_id": vehicle_id.to_string(),
            })),
            VelocityError::Transport(e) => Some(serde_json::json!({
                "retryable": e.is_retryable(),
            })),
            _ => None,
        }
    }
}

impl From<StoreError> for VelocityError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => VelocityError::NotFound {
                collection,
                id: id.to_string(),
            },
            other => VelocityError::Transport(other),
        }
    }
}

impl From<validator::ValidationErrors> for VelocityError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: camel_case(&field),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        VelocityError::Validation(fields)
    }
}

/// Field names are reported the way they appear in JSON bodies
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for VelocityError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

/// Result alias used across the crate
pub type Result<T, E = VelocityError> = std::result::Result<T, E>;
