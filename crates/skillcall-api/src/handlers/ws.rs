//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{info, warn};

use skillcall_auth::Claims;

use crate::error::ApiError;
use crate::state::AppState;

const CLOSE_FLUSH: Duration = Duration::from_secs(1);

/// Query parameter for WebSocket authentication.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// JWT access token.
    pub token: String,
}

/// GET /ws?token={jwt}
pub async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Authenticate before upgrade
    let claims = state.jwt_decoder.decode_access_token(&query.token)?;
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, claims, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, claims: Claims, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let connections = state.realtime.connections.clone();
    let (handle, mut outbound_rx) = connections.register(claims.sub.clone());
    let conn_id = handle.id;

    info!(conn_id = %conn_id, user_id = %claims.sub, "WebSocket connection established");

    let ping_every = Duration::from_secs(state.config.realtime.ping_interval_seconds.max(1));
    let writer_handle = handle.clone();
    let mut outbound_task = tokio::spawn(async move {
        let mut ping = tokio::time::interval(ping_every);
        ping.tick().await;
        loop {
            tokio::select! {
                msg = outbound_rx.recv() => {
                    let Some(msg) = msg else { break };
                    let text = match serde_json::to_string(&msg) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(conn_id = %conn_id, error = %e, "Failed to encode outbound message");
                            continue;
                        }
                    };
                    if ws_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
                _ = writer_handle.closed() => {
                    let _ = ws_tx.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    loop {
        let frame = tokio::select! {
            frame = ws_rx.next() => frame,
            _ = handle.closed() => {
                info!(conn_id = %conn_id, "Connection closed by server");
                break;
            }
        };
        match frame {
            Some(Ok(Message::Text(text))) => connections.handle_inbound(&conn_id, text.as_str()),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    connections.unregister(&conn_id);
    // Give the writer a moment to flush its close frame.
    if tokio::time::timeout(CLOSE_FLUSH, &mut outbound_task).await.is_err() {
        outbound_task.abort();
    }

    info!(conn_id = %conn_id, user_id = %claims.sub, "WebSocket connection closed");
}
