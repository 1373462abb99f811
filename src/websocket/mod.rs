//! Live quote feed over WebSocket at `/ws`.

mod handler;
mod room_manager;

pub use handler::ws_handler;
pub use room_manager::{ClientSubscription, RoomManager, CLIENT_QUEUE_CAPACITY};
