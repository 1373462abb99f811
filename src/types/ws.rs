use super::{Quote, WatchlistSnapshot};
use serde::{Deserialize, Serialize};

/// Incoming WebSocket message from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Subscribe { symbols: Vec<String> },
    Unsubscribe { symbols: Vec<String> },
}

/// Outgoing WebSocket message to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Subscribed {
        symbols: Vec<String>,
    },
    Unsubscribed {
        symbols: Vec<String>,
    },
    /// Full snapshot, sent once on connect
    Watchlist {
        data: WatchlistSnapshot,
    },
    /// One tick, filtered to the client's subscriptions
    Quotes {
        tick: u64,
        timestamp: i64,
        data: Vec<Quote>,
    },
    Error {
        error: String,
    },
}
