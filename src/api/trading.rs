//! Trading API
//!
//! Endpoints for the paper ledger. All require a bearer session.
//!
//! Orders:
//! - POST /api/trading/orders - Place an order and settle it
//! - POST /api/trading/orders/preview - Dry-run an order
//! - GET /api/trading/orders - Order history, newest first (`?limit=`)
//!
//! Portfolio:
//! - GET /api/trading/portfolio - Positions valued at current quotes
//! - POST /api/trading/portfolio/reset - Clear positions and history

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::auth::Authenticated;
use crate::api::ApiResponse;
use crate::services::TradingError;
use crate::types::{Order, OrderPreview, PlaceOrderRequest, PortfolioSummary, Settlement};
use crate::AppState;

/// Create trading router.
pub fn router() -> Router<AppState> {
    Router::new()
        // Order routes
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/preview", post(preview_order))
        // Portfolio routes
        .route("/portfolio", get(get_portfolio))
        .route("/portfolio/reset", post(reset_portfolio))
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Convert TradingError to HTTP response.
impl IntoResponse for TradingError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            TradingError::InsufficientHoldings { .. } => {
                (StatusCode::BAD_REQUEST, "INSUFFICIENT_HOLDINGS")
            }
            TradingError::UnknownInstrument(_) => (StatusCode::NOT_FOUND, "UNKNOWN_INSTRUMENT"),
            TradingError::InvalidQuantity(_) => (StatusCode::BAD_REQUEST, "INVALID_QUANTITY"),
            TradingError::InvalidPrice(_) => (StatusCode::BAD_REQUEST, "INVALID_PRICE"),
            TradingError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub success: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /api/trading/orders
async fn place_order(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Settlement>>), TradingError> {
    let settlement = state.trading.place_order(&auth.user.email, &request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::new(settlement))))
}

/// POST /api/trading/orders/preview
async fn preview_order(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<Json<ApiResponse<OrderPreview>>, TradingError> {
    let preview = state.trading.preview(&auth.user.email, &request).await?;
    Ok(Json(ApiResponse::new(preview)))
}

/// GET /api/trading/orders
async fn list_orders(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, TradingError> {
    let orders = state.trading.orders(&auth.user.email, query.limit).await?;
    Ok(Json(ApiResponse::new(orders)))
}

/// GET /api/trading/portfolio
async fn get_portfolio(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<PortfolioSummary>>, TradingError> {
    let summary = state.trading.portfolio(&auth.user.email).await?;
    Ok(Json(ApiResponse::new(summary)))
}

/// POST /api/trading/portfolio/reset
async fn reset_portfolio(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Result<Json<ApiResponse<ResetResponse>>, TradingError> {
    state.trading.reset(&auth.user.email).await?;
    Ok(Json(ApiResponse::new(ResetResponse { success: true })))
}
