use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::room_manager::CLIENT_QUEUE_CAPACITY;
use crate::types::{ClientMessage, ServerMessage};
use crate::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Bounded queue; a client that stops reading is dropped
    let (tx, mut rx) = mpsc::channel::<String>(CLIENT_QUEUE_CAPACITY);

    let client_id = state.room_manager.register(tx);
    info!("WebSocket client connected: {}", client_id);

    // Forward queued messages to the socket. The queue closes once the
    // client is unregistered.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                return;
            }
        }
        let _ = sender.send(Message::Close(None)).await;
    });

    // Subscribe before sending the snapshot so no tick falls in between
    let mut tick_rx = state.simulator.subscribe();
    send_snapshot(&state, client_id);

    let room_manager = state.room_manager.clone();
    let broadcast_task = tokio::spawn(async move {
        loop {
            match tick_rx.recv().await {
                Ok(snapshot) => {
                    let Some(msg) = room_manager.quotes_for(client_id, &snapshot) else {
                        break;
                    };
                    if !room_manager.send(client_id, &msg) {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Client {} lagged, skipped {} ticks", client_id, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!("Received message from {}: {}", client_id, text);
                handle_message(&state, client_id, &text);
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnecting: {}", client_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by axum
                debug!("Received ping from {}", client_id);
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    // Clean up
    state.room_manager.unregister(client_id);
    send_task.abort();
    broadcast_task.abort();
    info!("WebSocket client disconnected: {}", client_id);
}

/// Queue the full watchlist for a freshly connected client.
fn send_snapshot(state: &AppState, client_id: Uuid) -> bool {
    let opening = ServerMessage::Watchlist {
        data: state.simulator.snapshot().as_ref().clone(),
    };
    state.room_manager.send(client_id, &opening)
}

fn handle_message(state: &AppState, client_id: Uuid, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            send_error(state, client_id, &format!("Invalid message: {}", e));
            return;
        }
    };

    match msg {
        ClientMessage::Subscribe { symbols } => {
            let (known, unknown): (Vec<String>, Vec<String>) = symbols
                .into_iter()
                .partition(|s| state.simulator.instrument(s.trim()).is_some());

            if !unknown.is_empty() {
                send_error(
                    state,
                    client_id,
                    &format!("Unknown symbols: {}", unknown.join(", ")),
                );
            }

            let subscribed = state.room_manager.subscribe(client_id, &known);
            debug!("Client {} subscribed to: {:?}", client_id, subscribed);

            let response = ServerMessage::Subscribed { symbols: subscribed };
            state.room_manager.send(client_id, &response);
        }
        ClientMessage::Unsubscribe { symbols } => {
            let unsubscribed = state.room_manager.unsubscribe(client_id, &symbols);
            debug!("Client {} unsubscribed from: {:?}", client_id, unsubscribed);

            let response = ServerMessage::Unsubscribed {
                symbols: unsubscribed,
            };
            state.room_manager.send(client_id, &response);
        }
    }
}

fn send_error(state: &AppState, client_id: Uuid, error: &str) {
    let msg = ServerMessage::Error {
        error: error.to_string(),
    };
    state.room_manager.send(client_id, &msg);
}
