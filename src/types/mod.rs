pub mod auth;
pub mod chat;
pub mod instrument;
pub mod market;
pub mod trading;
pub mod ws;

pub use auth::*;
pub use chat::*;
pub use instrument::*;
pub use market::*;
pub use trading::*;
pub use ws::*;
