//! Rental records, the status state machine and booking input

use crate::core::document::Document;
use crate::core::error::{FieldError, Result, VelocityError};
use crate::core::field::{FieldFormat, FieldValue};
use crate::core::session::CustomerSession;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Lifecycle status of a rental
///
/// ```text
/// pending ──▶ active ──▶ completed
///    │
///    └──────▶ cancelled
/// ```
///
/// `completed` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Active,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 4] = [
        RentalStatus::Pending,
        RentalStatus::Active,
        RentalStatus::Completed,
        RentalStatus::Cancelled,
    ];

    /// Statuses that hold a vehicle
    pub const OPEN: [RentalStatus; 2] = [RentalStatus::Pending, RentalStatus::Active];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Cancelled)
    }

    /// Whether a rental in this status occupies its vehicle
    pub fn is_open(&self) -> bool {
        matches!(self, RentalStatus::Pending | RentalStatus::Active)
    }

    /// The only legal edges are pending→active, active→completed and
    /// pending→cancelled.
    pub fn can_transition_to(&self, next: RentalStatus) -> bool {
        matches!(
            (self, next),
            (RentalStatus::Pending, RentalStatus::Active)
                | (RentalStatus::Active, RentalStatus::Completed)
                | (RentalStatus::Pending, RentalStatus::Cancelled)
        )
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = VelocityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RentalStatus::Pending),
            "active" => Ok(RentalStatus::Active),
            "completed" => Ok(RentalStatus::Completed),
            "cancelled" => Ok(RentalStatus::Cancelled),
            other => Err(VelocityError::validation(
                "status",
                format!("unknown rental status '{}'", other),
            )),
        }
    }
}

impl From<RentalStatus> for FieldValue {
    fn from(status: RentalStatus) -> Self {
        FieldValue::String(status.as_str().to_string())
    }
}

/// A rental (collection `rentals`)
///
/// Vehicle and renter fields are copied at booking time and never follow
/// later edits to the catalog or the user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    pub confirmation_number: String,

    pub vehicle_id: Uuid,
    pub vehicle_name: String,
    pub vehicle_image: String,
    pub vehicle_type: String,
    pub daily_rate: u64,

    pub user_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,

    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub number_of_days: u32,
    pub subtotal: u64,
    pub total_amount: u64,

    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Rental {
    fn collection() -> &'static str {
        "rentals"
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn assign_id(&mut self, id: Uuid) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn field_value(&self, field: &str) -> Option<FieldValue> {
        match field {
            "id" => Some(self.id.into()),
            "confirmationNumber" => Some(self.confirmation_number.clone().into()),
            "vehicleId" => Some(self.vehicle_id.into()),
            "userId" => Some(self.user_id.clone().into()),
            "status" => Some(self.status.into()),
            "pickupDate" => Some(self.pickup_date.into()),
            "returnDate" => Some(self.return_date.into()),
            "totalAmount" => Some(self.total_amount.into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

fn validate_phone(value: &str) -> std::result::Result<(), ValidationError> {
    if FieldFormat::Phone.validate_str(value) {
        Ok(())
    } else {
        Err(ValidationError::new("phone").with_message("customer phone is not a valid phone number".into()))
    }
}

/// Input to [`RentalLedger::book`](crate::rental::RentalLedger::book)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub vehicle_id: Uuid,

    #[validate(length(min = 1, message = "user id is required"))]
    pub user_id: String,

    #[validate(length(min = 1, max = 120, message = "customer name is required"))]
    pub customer_name: String,

    #[validate(email(message = "customer email is not a valid email address"))]
    pub customer_email: String,

    #[validate(custom(function = "validate_phone"))]
    pub customer_phone: String,

    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,

    /// Pre-supplied confirmation number; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,
}

impl BookingRequest {
    /// Build a request for the renter behind `session`
    pub fn for_customer(
        session: &CustomerSession,
        vehicle_id: Uuid,
        pickup_date: NaiveDate,
        return_date: NaiveDate,
    ) -> Self {
        Self {
            vehicle_id,
            user_id: session.user_id.clone(),
            customer_name: session.full_name.clone(),
            customer_email: session.email.clone(),
            customer_phone: session.phone.clone(),
            pickup_date,
            return_date,
            confirmation_number: None,
        }
        .trimmed()
    }

    /// The same request with surrounding whitespace removed from the renter fields
    pub fn trimmed(mut self) -> Self {
        for field in [
            &mut self.user_id,
            &mut self.customer_name,
            &mut self.customer_email,
            &mut self.customer_phone,
        ] {
            *field = field.trim().to_string();
        }
        self
    }

    /// Check required renter fields and the date range.
    ///
    /// Renter fields are checked as they will be stored, i.e. trimmed. With
    /// `reject_past_pickup`, the pickup date must be after `today`.
    pub fn check(&self, today: NaiveDate, reject_past_pickup: bool) -> Result<()> {
        let mut errors = match self.clone().trimmed().validate() {
            Ok(()) => Vec::new(),
            Err(e) => match VelocityError::from(e) {
                VelocityError::Validation(fields) => fields,
                other => return Err(other),
            },
        };

        if self.return_date <= self.pickup_date {
            errors.push(FieldError {
                field: "returnDate".to_string(),
                message: "return date must be after pickup date".to_string(),
            });
        }

        if reject_past_pickup && self.pickup_date <= today {
            errors.push(FieldError {
                field: "pickupDate".to_string(),
                message: "pickup date must be in the future".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VelocityError::Validation(errors))
        }
    }
}

/// What the renter sees after booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub confirmation_number: String,
    pub vehicle_name: String,
    pub vehicle_image: String,
    pub vehicle_type: String,
    pub customer_name: String,
    pub customer_email: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub number_of_days: u32,
    pub daily_rate: u64,
    pub subtotal: u64,
    pub total_amount: u64,
    pub status: RentalStatus,
    pub booked_at: DateTime<Utc>,
}

impl From<&Rental> for Receipt {
    fn from(rental: &Rental) -> Self {
        Self {
            confirmation_number: rental.confirmation_number.clone(),
            vehicle_name: rental.vehicle_name.clone(),
            vehicle_image: rental.vehicle_image.clone(),
            vehicle_type: rental.vehicle_type.clone(),
            customer_name: rental.customer_name.clone(),
            customer_email: rental.customer_email.clone(),
            pickup_date: rental.pickup_date,
            return_date: rental.return_date,
            number_of_days: rental.number_of_days,
            daily_rate: rental.daily_rate,
            subtotal: rental.subtotal,
            total_amount: rental.total_amount,
            status: rental.status,
            booked_at: rental.created_at,
        }
    }
}

/// Rental counts per status, plus revenue from completed rentals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentalStats {
    pub total: usize,
    pub pending: usize,
    pub active: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub revenue: u64,
}

impl RentalStats {
    pub fn tally<'a>(rentals: impl IntoIterator<Item = &'a Rental>) -> Self {
        let mut stats = RentalStats::default();
        for rental in rentals {
            stats.total += 1;
            match rental.status {
                RentalStatus::Pending => stats.pending += 1,
                RentalStatus::Active => stats.active += 1,
                RentalStatus::Completed => {
                    stats.completed += 1;
                    stats.revenue = stats.revenue.saturating_add(rental.total_amount);
                }
                RentalStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}
