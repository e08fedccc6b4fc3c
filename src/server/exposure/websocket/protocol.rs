//! WebSocket message protocol for live rental lists
//!
//! ## Client → Server Messages
//!
//! ```json
//! {"type": "ping"}
//! ```
//!
//! ## Server → Client Messages
//!
//! ```json
//! // Sent once after the upgrade
//! {"type": "welcome", "connection_id": "…", "user_id": "uid-1"}
//!
//! // Full rental list, newest first, on connect and after every change
//! {"type": "rentals", "data": [ {...}, {...} ]}
//!
//! {"type": "pong"}
//! {"type": "error", "message": "…"}
//! ```

use crate::rental::Rental;
use serde::{Deserialize, Serialize};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive ping
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        connection_id: String,
        user_id: String,
    },
    /// The customer's complete rental list
    Rentals { data: Vec<Rental> },
    Pong,
    Error { message: String },
}
