//! Dalal - simulated stock-trading dashboard server

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod types;
pub mod websocket;

use config::Config;
use services::{
    AuthService, ChatResponder, KeyValueStore, MemoryKvStore, PriceSimulator, SqliteKvStore,
    StoreError, TradingService,
};
use std::sync::Arc;
use tracing::info;
use websocket::RoomManager;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub simulator: Arc<PriceSimulator>,
    pub trading: TradingService,
    pub auth: AuthService,
    pub chat: Arc<ChatResponder>,
    pub room_manager: Arc<RoomManager>,
}

impl AppState {
    /// Wire every service on top of one key-value store.
    pub fn new(
        config: Config,
        instruments: Vec<types::Instrument>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let simulator = PriceSimulator::new(instruments, config.price_band_pct);
        let trading = TradingService::new(
            Arc::clone(&store),
            Arc::clone(&simulator),
            config.max_order_quantity,
        );
        let auth = AuthService::new(store, config.session_ttl_hours);

        Self {
            config: Arc::new(config),
            simulator,
            trading,
            auth,
            chat: Arc::new(ChatResponder::new()),
            room_manager: RoomManager::new(),
        }
    }
}

/// Open the configured store: SQLite when a database path is set, memory otherwise.
pub fn open_store(config: &Config) -> Result<Arc<dyn KeyValueStore>, StoreError> {
    match &config.database_path {
        Some(path) => {
            info!("Using SQLite store at {}", path.display());
            Ok(Arc::new(SqliteKvStore::new(path)?))
        }
        None => {
            info!("DATABASE_PATH not set, state will not survive restarts");
            Ok(Arc::new(MemoryKvStore::new()))
        }
    }
}

/// The full HTTP application: REST API, WebSocket feed, CORS and tracing.
pub fn app(state: AppState) -> axum::Router {
    use tower::ServiceBuilder;
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .merge(api::router())
        .route("/ws", axum::routing::get(websocket::ws_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

// Re-export commonly used types
pub use types::*;
