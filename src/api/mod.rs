pub mod auth;
pub mod chat;
pub mod health;
pub mod market;
pub mod trading;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// Success envelope: every JSON body is `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/market", market::router())
        .nest("/api/trading", trading::router())
        .merge(chat::router())
        .fallback(crate::error::not_found)
}
