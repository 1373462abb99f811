pub mod auth;
pub mod chat;
pub mod kv_store;
pub mod ledger;
pub mod price_simulator;
pub mod trading;

pub use auth::{AuthError, AuthService};
pub use chat::{ChatContext, ChatResponder};
pub use kv_store::{KeyValueStore, MemoryKvStore, SqliteKvStore, StoreError};
pub use ledger::Ledger;
pub use price_simulator::{load_instruments, InstrumentLoadError, PriceSimulator};
pub use trading::{TradingError, TradingService};
