//! Vehicle records and the payloads used to create and edit them

use crate::core::document::Document;
use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Vehicle types offered in the product. The stored field is a free string;
/// this list is what the admin console offers.
pub const KNOWN_VEHICLE_TYPES: &[&str] = &["sedan", "suv", "sports", "electric", "luxury", "truck"];

/// A vehicle in the catalog (collection `vehicles`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default = "Uuid::nil")]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    /// Daily rate in whole currency units
    pub price: u64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub description: String,
    /// Admin's manual listing toggle. Independent of rental occupancy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Whether the admin left the vehicle listed. A missing flag counts as listed.
    pub fn is_listed(&self) -> bool {
        self.available != Some(false)
    }
}

impl Document for Vehicle {
    fn collection() -> &'static str {
        "vehicles"
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
            "name" => Some(self.name.clone().into()),
            "type" => Some(self.vehicle_type.clone().into()),
            "price" => Some(self.price.into()),
            "rating" => Some(FieldValue::Float(f64::from(self.rating))),
            "available" => Some(self.available.into()),
            "createdAt" => Some(self.created_at.into()),
            "updatedAt" => Some(self.updated_at.into()),
            _ => None,
        }
    }
}

fn default_available() -> bool {
    true
}

/// Fields required to add a vehicle to the catalog
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewVehicle {
    #[validate(length(min = 1, max = 120, message = "name is required"))]
    pub name: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 40, message = "type is required"))]
    pub vehicle_type: String,
    #[validate(range(min = 1, message = "price must be positive"))]
    pub price: u64,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: f32,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

impl NewVehicle {
    /// Build the stored record. The id is assigned by the store.
    pub fn into_vehicle(self) -> Vehicle {
        let now = Utc::now();
        Vehicle {
            id: Uuid::nil(),
            name: self.name.trim().to_string(),
            vehicle_type: self.vehicle_type.trim().to_lowercase(),
            price: self.price,
            image: self.image.trim().to_string(),
            rating: self.rating,
            description: self.description,
            available: Some(self.available),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a vehicle; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePatch {
    #[validate(length(min = 1, max = 120, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 40, message = "type cannot be empty"))]
    pub vehicle_type: Option<String>,
    #[validate(range(min = 1, message = "price must be positive"))]
    pub price: Option<u64>,
    pub image: Option<String>,
    #[validate(range(min = 0.0, max = 5.0, message = "rating must be between 0 and 5"))]
    pub rating: Option<f32>,
    pub description: Option<String>,
    pub available: Option<bool>,
}

impl VehiclePatch {
    /// Apply the patch and bump `updated_at`
    pub fn apply_to(self, vehicle: &mut Vehicle) {
        if let Some(name) = self.name {
            vehicle.name = name.trim().to_string();
        }
        if let Some(vehicle_type) = self.vehicle_type {
            vehicle.vehicle_type = vehicle_type.trim().to_lowercase();
        }
        if let Some(price) = self.price {
            vehicle.price = price;
        }
        if let Some(image) = self.image {
            vehicle.image = image.trim().to_string();
        }
        if let Some(rating) = self.rating {
            vehicle.rating = rating;
        }
        if let Some(description) = self.description {
            vehicle.description = description;
        }
        if let Some(available) = self.available {
            vehicle.available = Some(available);
        }
        vehicle.updated_at = Utc::now();
    }
}
