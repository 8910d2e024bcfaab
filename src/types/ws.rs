use super::Trade;
use serde::{Deserialize, Serialize};

/// Incoming WebSocket message from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Only receive trades from these traders. An empty filter means all.
    Subscribe {
        traders: Vec<String>,
    },
    Unsubscribe {
        traders: Vec<String>,
    },
}

/// Outgoing WebSocket message to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A batch of freshly generated trades.
    Trades {
        trades: Vec<Trade>,
    },
    Subscribed {
        traders: Vec<String>,
    },
    Unsubscribed {
        traders: Vec<String>,
    },
    Error {
        error: String,
    },
}
