//! Rental server example
//!
//! Seeds a small catalog into an in-memory store and serves the full API.
//!
//! ```text
//! cargo run --example rental_server --features websocket -- velocity.yaml
//! ```
//!
//! The config file argument is optional. `RUST_LOG` controls log output and
//! `VELOCITY_BIND` overrides the listen address.

use anyhow::Result;
use tracing_subscriber::EnvFilter;
use velocity::prelude::*;

fn seed_vehicles() -> Vec<NewVehicle> {
    let vehicle = |name: &str, vehicle_type: &str, price: u64, rating: f32, image: &str| NewVehicle {
        name: name.to_string(),
        vehicle_type: vehicle_type.to_string(),
        price,
        image: image.to_string(),
        rating,
        description: format!("{} available for daily rental", name),
        available: true,
    };

    vec![
        vehicle("Toyota Vios", "sedan", 1500, 4.5, "/images/Toyota Vios.png"),
        vehicle("Honda City", "sedan", 1600, 4.4, "/images/Honda City.png"),
        vehicle("Toyota Fortuner", "suv", 3500, 4.7, "/images/Toyota Fortuner.png"),
        vehicle("Ford Ranger", "truck", 3000, 4.3, "/images/Ford Ranger.png"),
        vehicle("Tesla Model 3", "electric", 5000, 4.9, "/images/Tesla Model 3.png"),
        vehicle("BMW 5 Series", "luxury", 7000, 4.8, "/images/BMW 5 Series.png"),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,velocity=debug")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => VelocityConfig::from_yaml_file(&path)?,
        None => VelocityConfig::default(),
    };

    let vehicles = InMemoryDocumentStore::<Vehicle>::with_event_bus(EventBus::new(config.events.capacity));
    let catalog = VehicleCatalog::new(Arc::new(vehicles.clone()));
    for input in seed_vehicles() {
        let vehicle = catalog.create(input).await?;
        tracing::info!(vehicle_id = %vehicle.id, name = %vehicle.name, "seeded vehicle");
    }

    let addr = config.bind_address();
    println!("\n🌐 Rental server running on http://{}", addr);
    println!("\n  🔷 Public:");
    println!("    GET    /vehicles[?type=suv]");
    println!("    GET    /vehicles/available");
    println!("    GET    /vehicles/{{id}}");
    println!("\n  🔷 Customer (x-user-id, x-user-name, x-user-email, x-user-phone):");
    println!("    POST   /rentals");
    println!("    POST   /rentals/quote");
    println!("    GET    /rentals/confirmation/{{code}}");
    println!("    GET    /me/rentals");
    println!("    POST   /me/rentals/{{id}}/cancel");
    println!("    GET    /me/rentals/live   (websocket feature)");
    println!("\n  🔷 Admin (x-admin-id, x-admin-email):");
    println!("    GET    /admin/dashboard");
    println!("    GET    /admin/rentals[?status=pending]");
    println!("    POST   /admin/rentals/{{id}}/approve|complete|cancel");
    println!("    DELETE /admin/rentals/{{id}}");
    println!("    POST   /admin/vehicles");

    ServerBuilder::new()
        .with_config(config)
        .with_vehicle_store(vehicles)
        .serve(&addr)
        .await
}
