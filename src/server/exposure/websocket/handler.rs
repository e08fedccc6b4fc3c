//! WebSocket upgrade handler and per-connection loop
//!
//! Each connection gets:
//!
//! 1. A welcome message with its connection id
//! 2. The customer's rental list, then a fresh list after every change
//! 3. Pong replies to client pings
//!
//! The rental subscription is dropped (and its watch released) when the
//! client disconnects.

use super::protocol::{ClientMessage, ServerMessage};
use crate::core::error::VelocityError;
use crate::core::session::CustomerSession;
use crate::server::host::AppHost;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::SinkExt;
use futures::stream::{SplitSink, StreamExt};
use std::sync::Arc;
use uuid::Uuid;

/// GET /me/rentals/live
///
/// The session is resolved before upgrading, so an anonymous request gets a
/// plain 401 instead of a socket.
pub async fn live_rentals_handler(
    ws: WebSocketUpgrade,
    State(host): State<Arc<AppHost>>,
    headers: HeaderMap,
) -> Result<Response, VelocityError> {
    let session = host.sessions.customer_session(&headers).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, host, session)))
}

async fn send(
    ws_write: &mut SplitSink<WebSocket, Message>,
    connection_id: &str,
    msg: &ServerMessage,
) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => ws_write.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!(connection_id = %connection_id, error = %e, "Failed to serialize ServerMessage");
            true
        }
    }
}

async fn handle_socket(socket: WebSocket, host: Arc<AppHost>, session: CustomerSession) {
    let connection_id = Uuid::new_v4().to_string();
    let (mut ws_write, mut ws_read) = socket.split();

    let welcome = ServerMessage::Welcome {
        connection_id: connection_id.clone(),
        user_id: session.user_id.clone(),
    };
    if !send(&mut ws_write, &connection_id, &welcome).await {
        return;
    }

    let mut rentals = host.ledger.subscribe_to_user_rentals(&session.user_id);
    tracing::debug!(connection_id = %connection_id, user_id = %session.user_id, "live rentals connected");

    loop {
        tokio::select! {
            snapshot = rentals.next() => {
                let msg = match snapshot {
                    Some(Ok(data)) => ServerMessage::Rentals { data },
                    Some(Err(e)) => ServerMessage::Error { message: e.to_string() },
                    None => break,
                };
                if !send(&mut ws_write, &connection_id, &msg).await {
                    tracing::debug!(connection_id = %connection_id, "WebSocket write failed, closing");
                    break;
                }
            }
            incoming = ws_read.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Ping) => ServerMessage::Pong,
                        Err(e) => ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    };
                    if !send(&mut ws_write, &connection_id, &reply).await {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::debug!(connection_id = %connection_id, "Client closed connection");
                    break;
                }
                Some(Ok(_)) => {
                    // axum answers pings; binary frames are ignored
                }
                Some(Err(e)) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "WebSocket read error");
                    break;
                }
            },
        }
    }

    rentals.cancel();
}
