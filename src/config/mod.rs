//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! ledger:
//!   enforce_exclusive_occupancy: true
//!   confirmation_prefix: VR
//! catalog:
//!   image_base_url: https://velocity-769e6.web.app
//! ```
//!
//! Every section and field is optional and falls back to its default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `server.host:server.port`
pub const BIND_ENV_VAR: &str = "VELOCITY_BIND";

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Rental ledger behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Reject a booking when the vehicle already has a pending or active rental.
    ///
    /// When false, bookings are written without the occupancy guard and two
    /// concurrent bookings of the same vehicle can both succeed.
    pub enforce_exclusive_occupancy: bool,

    /// Prefix of generated confirmation numbers
    pub confirmation_prefix: String,

    /// How many generated confirmation numbers to try before giving up
    pub max_confirmation_attempts: u32,

    /// Reject bookings whose pickup date is not after today
    pub reject_past_pickup: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enforce_exclusive_occupancy: true,
            confirmation_prefix: "VR".to_string(),
            max_confirmation_attempts: 5,
            reject_past_pickup: false,
        }
    }
}

/// Vehicle catalog settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL that relative vehicle image paths are resolved against
    pub image_base_url: Option<String>,
}

/// Change feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    /// Broadcast buffer size per store
    pub capacity: usize,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub server: ServerConfig,
    pub ledger: LedgerConfig,
    pub catalog: CatalogConfig,
    pub events: EventsConfig,
}

impl VelocityConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("Invalid config file {}", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Address the HTTP server binds to, honouring `VELOCITY_BIND`
    pub fn bind_address(&self) -> String {
        std::env::var(BIND_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| format!("{}:{}", self.server.host, self.server.port))
    }
}
