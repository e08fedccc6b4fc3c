//! HTTP server: builder, shared host and protocol exposures

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use host::AppHost;

#[cfg(feature = "websocket")]
pub use exposure::WebSocketExposure;
