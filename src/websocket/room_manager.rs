use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::types::{ServerMessage, WatchlistSnapshot};

/// Messages queued per client before it is considered stalled.
pub const CLIENT_QUEUE_CAPACITY: usize = 64;

/// A connected client's watch set.
pub struct ClientSubscription {
    /// Upper-cased symbols. Empty means the whole watchlist.
    pub symbols: HashSet<String>,
    /// Channel to send messages to the client.
    pub tx: mpsc::Sender<String>,
}

/// Tracks live WebSocket clients and the symbols each one follows.
pub struct RoomManager {
    pub clients: DashMap<Uuid, ClientSubscription>,
}

impl RoomManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a new client.
    pub fn register(&self, tx: mpsc::Sender<String>) -> Uuid {
        let client_id = Uuid::new_v4();
        self.clients.insert(
            client_id,
            ClientSubscription {
                symbols: HashSet::new(),
                tx,
            },
        );
        client_id
    }

    pub fn unregister(&self, client_id: Uuid) {
        self.clients.remove(&client_id);
    }

    /// Add symbols to a client's watch set. Returns the newly added ones.
    pub fn subscribe(&self, client_id: Uuid, symbols: &[String]) -> Vec<String> {
        let mut subscribed = Vec::new();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for symbol in symbols {
                let symbol = symbol.trim().to_uppercase();
                if !symbol.is_empty() && client.symbols.insert(symbol.clone()) {
                    subscribed.push(symbol);
                }
            }
        }

        subscribed
    }

    /// Remove symbols from a client's watch set. Returns the ones actually removed.
    pub fn unsubscribe(&self, client_id: Uuid, symbols: &[String]) -> Vec<String> {
        let mut unsubscribed = Vec::new();

        if let Some(mut client) = self.clients.get_mut(&client_id) {
            for symbol in symbols {
                let symbol = symbol.trim().to_uppercase();
                if client.symbols.remove(&symbol) {
                    unsubscribed.push(symbol);
                }
            }
        }

        unsubscribed
    }

    /// Sorted watch set for a client, `None` if it is not connected.
    pub fn subscriptions(&self, client_id: Uuid) -> Option<Vec<String>> {
        self.clients.get(&client_id).map(|client| {
            let mut symbols: Vec<String> = client.symbols.iter().cloned().collect();
            symbols.sort();
            symbols
        })
    }

    /// Build the per-tick message for one client, filtered to its watch set.
    pub fn quotes_for(&self, client_id: Uuid, snapshot: &WatchlistSnapshot) -> Option<ServerMessage> {
        let symbols = self.subscriptions(client_id)?;
        let data = snapshot.filtered(&symbols).into_iter().cloned().collect();

        Some(ServerMessage::Quotes {
            tick: snapshot.tick,
            timestamp: snapshot.timestamp,
            data,
        })
    }

    /// Serialize and queue a message for one client.
    ///
    /// A client whose queue is full is dropped; returns false in that case
    /// and when the client is gone.
    pub fn send(&self, client_id: Uuid, msg: &ServerMessage) -> bool {
        let Ok(json) = serde_json::to_string(msg) else {
            return false;
        };

        let result = match self.clients.get(&client_id) {
            Some(client) => client.tx.try_send(json),
            None => return false,
        };

        match result {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!("Client {} queue full, dropping", client_id);
                self.unregister(client_id);
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
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
