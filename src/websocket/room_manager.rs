use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::types::Trade;

/// A client's subscription information.
pub struct ClientSubscription {
    /// Trader ids the client follows on the live feed. Empty means every trader.
    pub traders: HashSet<String>,
    /// Channel to send messages to the client.
    pub tx: mpsc::UnboundedSender<String>,
}

impl ClientSubscription {
    pub fn wants(&self, trader_id: &str) -> bool {
        self.traders.is_empty() || self.traders.contains(trader_id)
    }
}

/// Manages WebSocket clients and their trader filters.
pub struct RoomManager {
    /// Client subscriptions keyed by client ID.
    pub clients: DashMap<Uuid, ClientSubscription>,
}

impl RoomManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new client with an empty filter.
    pub fn register(&self, tx: mpsc::UnboundedSender<String>) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientSubscription {
                traders: HashSet::new(),
                tx,
            },
        );
        client_id
    }

    pub fn unregister(&self, client_id: Uuid) {
        self.clients.remove(&client_id);
    }

    /// Add traders to a client's filter. Returns the ids that were new.
    pub fn subscribe(&self, client_id: Uuid, traders: &[String]) -> Vec<String> {
        let mut subscribed = Vec::new();
        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for trader in traders {
                let trader = trader.trim();
                if !trader.is_empty() && client.traders.insert(trader.to_string()) {
                    subscribed.push(trader.to_string());
                }
            }
        }
        subscribed
    }

    /// Remove traders from a client's filter. Returns the ids that were removed.
    pub fn unsubscribe(&self, client_id: Uuid, traders: &[String]) -> Vec<String> {
        let mut unsubscribed = Vec::new();
        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for trader in traders {
                if client.traders.remove(trader.trim()) {
                    unsubscribed.push(trader.trim().to_string());
                }
            }
        }
        unsubscribed
    }

    /// The part of `trades` a client should see, or `None` if it is gone.
    pub fn filter_trades(&self, client_id: Uuid, trades: &[Trade]) -> Option<Vec<Trade>> {
        let client = self.clients.get(&client_id)?;
        Some(
            trades
                .iter()
                .filter(|t| client.wants(&t.trader_id))
                .cloned()
                .collect(),
        )
    }

    /// Clients that would receive a trade by `trader_id`.
    pub fn subscriber_count(&self, trader_id: &str) -> usize {
        self.clients.iter().filter(|c| c.wants(trader_id)).count()
    }

    /// Send a raw message to one client.
    pub fn send(&self, client_id: Uuid, message: String) -> bool {
        match self.clients.get(&client_id) {
            Some(client) => client.tx.send(message).is_ok(),
            None => false,
        }
    }

    /// Broadcast a message to all connected clients.
    pub fn broadcast_all(&self, message: &str) {
        for client in self.clients.iter() {
            let _ = client.tx.send(message.to_string());
        }
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self {
            clients: DashMap::new(),
        }
    }
}
