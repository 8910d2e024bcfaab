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

use crate::types::{ClientMessage, ServerMessage};
use crate::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let client_id = state.room_manager.register(tx);
    info!("WebSocket client connected: {}", client_id);

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // Push each feed batch, filtered to the client's traders
    let mut trades_rx = state.feed.subscribe();
    let room_manager = state.room_manager.clone();
    let broadcast_task = tokio::spawn(async move {
        loop {
            let batch = match trades_rx.recv().await {
                Ok(batch) => batch,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Client {} lagged, skipped {} batches", client_id, skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let Some(trades) = room_manager.filter_trades(client_id, &batch) else {
                break;
            };
            if trades.is_empty() {
                continue;
            }

            if let Ok(json) = serde_json::to_string(&ServerMessage::Trades { trades }) {
                room_manager.send(client_id, json);
            }
        }
    });

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
                debug!("Received ping from {}", client_id);
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    state.room_manager.unregister(client_id);
    send_task.abort();
    broadcast_task.abort();
    info!("WebSocket client disconnected: {}", client_id);
}

fn handle_message(state: &AppState, client_id: Uuid, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            send_error(state, client_id, &format!("Invalid message: {}", e));
            return;
        }
    };

    let response = match msg {
        ClientMessage::Subscribe { traders } => {
            let subscribed = state.room_manager.subscribe(client_id, &traders);
            debug!("Client {} subscribed to: {:?}", client_id, subscribed);
            ServerMessage::Subscribed { traders: subscribed }
        }
        ClientMessage::Unsubscribe { traders } => {
            let unsubscribed = state.room_manager.unsubscribe(client_id, &traders);
            debug!("Client {} unsubscribed from: {:?}", client_id, unsubscribed);
            ServerMessage::Unsubscribed {
                traders: unsubscribed,
            }
        }
    };
    send_message(state, client_id, &response);
}

fn send_message(state: &AppState, client_id: Uuid, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        state.room_manager.send(client_id, json);
    }
}

fn send_error(state: &AppState, client_id: Uuid, error: &str) {
    let msg = ServerMessage::Error {
        error: error.to_string(),
    };
    send_message(state, client_id, &msg);
}
