//! API exposures over the application host
//!
//! Each exposure consumes an `Arc<AppHost>` and produces a Router for its
//! protocol.

pub mod rest;

pub use rest::RestExposure;

#[cfg(feature = "websocket")]
pub mod websocket;

#[cfg(feature = "websocket")]
pub use websocket::WebSocketExposure;
