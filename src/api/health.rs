use crate::api::ApiResponse;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Ticks completed since startup
    tick: u64,
    instruments: usize,
}

async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::new(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        tick: state.simulator.snapshot().tick,
        instruments: state.simulator.instruments().len(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
