//! Vehicle catalog service

use super::model::{NewVehicle, Vehicle, VehiclePatch};
use crate::core::document::Document;
use crate::core::error::{Result, VelocityError};
use crate::core::query::Query;
use crate::core::store::DocumentStore;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// CRUD over the `vehicles` collection
///
/// Image paths are stored as entered by the admin. Reads resolve relative
/// paths (`/images/car.png`) against the configured base URL so every
/// surface receives an absolute URL.
#[derive(Clone)]
pub struct VehicleCatalog {
    store: Arc<dyn DocumentStore<Vehicle>>,
    image_base_url: Option<String>,
}

impl VehicleCatalog {
    pub fn new(store: Arc<dyn DocumentStore<Vehicle>>) -> Self {
        Self {
            store,
            image_base_url: None,
        }
    }

    /// Resolve relative image paths against this base URL
    pub fn with_image_base_url(mut self, base_url: Option<String>) -> Self {
        self.image_base_url = base_url.map(|b| b.trim_end_matches('/').to_string());
        self
    }

    /// Get a vehicle by id
    pub async fn get(&self, id: &Uuid) -> Result<Vehicle> {
        self.store
            .get(id)
            .await?
            .map(|v| self.resolve(v))
            .ok_or_else(|| VelocityError::not_found(Vehicle::collection(), id))
    }

    /// List every vehicle, listed or not
    pub async fn list(&self) -> Result<Vec<Vehicle>> {
        let vehicles = self.store.list().await?;
        Ok(vehicles.into_iter().map(|v| self.resolve(v)).collect())
    }

    /// List vehicles of one type (case-insensitive)
    pub async fn list_by_type(&self, vehicle_type: &str) -> Result<Vec<Vehicle>> {
        let query = Query::new().filter_eq("type", vehicle_type.trim().to_lowercase());
        let vehicles = self.store.query(&query).await?;
        Ok(vehicles.into_iter().map(|v| self.resolve(v)).collect())
    }

    /// Add a vehicle
    pub async fn create(&self, input: NewVehicle) -> Result<Vehicle> {
        input.validate()?;
        let vehicle = self.store.insert(input.into_vehicle()).await?;
        tracing::info!(vehicle_id = %vehicle.id, name = %vehicle.name, "vehicle created");
        Ok(self.resolve(vehicle))
    }

    /// Apply a partial update
    pub async fn update(&self, id: &Uuid, patch: VehiclePatch) -> Result<Vehicle> {
        patch.validate()?;
        let mut vehicle = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| VelocityError::not_found(Vehicle::collection(), id))?;

        patch.apply_to(&mut vehicle);
        let vehicle = self.store.replace(id, vehicle).await?;
        tracing::info!(vehicle_id = %id, "vehicle updated");
        Ok(self.resolve(vehicle))
    }

    /// Remove a vehicle. Existing rentals keep their snapshot.
    pub async fn delete(&self, id: &Uuid) -> Result<()> {
        self.store.delete(id).await?;
        tracing::info!(vehicle_id = %id, "vehicle deleted");
        Ok(())
    }

    fn resolve(&self, mut vehicle: Vehicle) -> Vehicle {
        vehicle.image = resolve_image_url(self.image_base_url.as_deref(), &vehicle.image);
        vehicle
    }
}

/// Turn a stored image reference into an absolute URL.
///
/// - empty stays empty
/// - `http://` and `https://` URLs are returned unchanged
/// - paths starting with `/` are percent-encoded and appended to `base_url`
///   (left as-is when no base is configured)
pub fn resolve_image_url(base_url: Option<&str>, image: &str) -> String {
    let image = image.trim();
    if image.is_empty() || image.starts_with("http://") || image.starts_with("https://") {
        return image.to_string();
    }

    match base_url {
        Some(base) if image.starts_with('/') => {
            format!(
                "{}{}",
                base.trim_end_matches('/'),
                utf8_percent_encode(image, PATH_SET)
            )
        }
        _ => image.to_string(),
    }
}

/// Everything outside the URI unreserved and reserved sets
const PATH_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b';')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b',')
    .remove(b'#');

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::storage::InMemoryDocumentStore;

    fn catalog() -> VehicleCatalog {
        VehicleCatalog::new(Arc::new(InMemoryDocumentStore::<Vehicle>::new()))
            .with_image_base_url(Some("https://cdn.example.com/".to_string()))
    }

    fn new_vehicle(name: &str, vehicle_type: &str, price: u64) -> NewVehicle {
        NewVehicle {
            name: name.to_string(),
            vehicle_type: vehicle_type.to_string(),
            price,
            image: format!("/images/{} car.png", name),
            rating: 4.0,
            description: String::new(),
            available: true,
        }
    }

    #[test]
    fn test_resolve_image_url() {
        let base = Some("https://velocity.example");
        assert_eq!(resolve_image_url(base, ""), "");
        assert_eq!(
            resolve_image_url(base, "https://other.example/a.png"),
            "https://other.example/a.png"
        );
        assert_eq!(
            resolve_image_url(base, "/images/Honda City.png"),
            "https://velocity.example/images/Honda%20City.png"
        );
        assert_eq!(resolve_image_url(None, "/images/a.png"), "/images/a.png");
        assert_eq!(resolve_image_url(base, "cars/a.png"), "cars/a.png");
    }

    #[test]
    fn test_resolve_image_url_encodes_utf8_and_percent() {
        let base = Some("https://velocity.example/");
        assert_eq!(
            resolve_image_url(base, "/images/Café 1.png"),
            "https://velocity.example/images/Caf%C3%A9%201.png"
        );
        assert_eq!(
            resolve_image_url(base, "/images/100%.png?v=2#top"),
            "https://velocity.example/images/100%25.png?v=2#top"
        );
    }

    #[tokio::test]
    async fn test_create_and_get_resolves_image() {
        let catalog = catalog();
        let created = catalog.create(new_vehicle("vios", "Sedan", 1500)).await.unwrap();

        let fetched = catalog.get(&created.id).await.unwrap();
        assert_eq!(fetched.vehicle_type, "sedan");
        assert_eq!(fetched.image, "https://cdn.example.com/images/vios%20car.png");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let err = catalog()
            .create(new_vehicle("", "suv", 0))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_list_by_type_is_case_insensitive() {
        let catalog = catalog();
        catalog.create(new_vehicle("a", "suv", 100)).await.unwrap();
        catalog.create(new_vehicle("b", "SUV", 200)).await.unwrap();
        catalog.create(new_vehicle("c", "truck", 300)).await.unwrap();

        assert_eq!(catalog.list_by_type("Suv").await.unwrap().len(), 2);
        assert_eq!(catalog.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let catalog = catalog();
        let created = catalog.create(new_vehicle("a", "suv", 100)).await.unwrap();

        let updated = catalog
            .update(
                &created.id,
                VehiclePatch {
                    price: Some(250),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.price, 250);

        catalog.delete(&created.id).await.unwrap();
        let err = catalog.get(&created.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_missing_vehicle_is_not_found() {
        let err = catalog()
            .update(&Uuid::new_v4(), VehiclePatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
