//! Market API
//!
//! - GET /api/market/watchlist - Current snapshot (optional `?symbols=TCS,INFY`)
//! - GET /api/market/quotes/:symbol - One quote
//! - GET /api/market/instruments - Reference data

use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::{Instrument, Quote, WatchlistSnapshot};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct WatchlistQuery {
    /// Comma-separated symbols
    pub symbols: Option<String>,
}

impl WatchlistQuery {
    fn symbols(&self) -> Vec<String> {
        self.symbols
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// GET /api/market/watchlist
async fn get_watchlist(
    State(state): State<AppState>,
    Query(query): Query<WatchlistQuery>,
) -> Json<ApiResponse<WatchlistSnapshot>> {
    let snapshot = state.simulator.snapshot();
    let symbols = query.symbols();

    let data = if symbols.is_empty() {
        snapshot.as_ref().clone()
    } else {
        WatchlistSnapshot {
            tick: snapshot.tick,
            timestamp: snapshot.timestamp,
            quotes: snapshot.filtered(&symbols).into_iter().cloned().collect(),
        }
    };

    Json(ApiResponse::new(data))
}

/// GET /api/market/quotes/:symbol
async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<ApiResponse<Quote>>> {
    state
        .simulator
        .quote(&symbol)
        .map(|quote| Json(ApiResponse::new(quote)))
        .ok_or(AppError::UnknownInstrument(symbol))
}

/// GET /api/market/instruments
async fn get_instruments(State(state): State<AppState>) -> Json<ApiResponse<Vec<Instrument>>> {
    Json(ApiResponse::new(state.simulator.instruments().to_vec()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/watchlist", get(get_watchlist))
        .route("/quotes/:symbol", get(get_quote))
        .route("/instruments", get(get_instruments))
}
