use axum::{extract::State, routing::post, Json, Router};

use crate::api::auth::Authenticated;
use crate::api::ApiResponse;
use crate::services::{ChatContext, TradingError};
use crate::types::{ChatReply, ChatRequest};
use crate::AppState;

/// POST /api/chat
///
/// Answer a free-text question from the live watchlist and the caller's
/// portfolio.
async fn chat(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatReply>>, TradingError> {
    let watchlist = state.simulator.snapshot();
    let portfolio = state.trading.portfolio(&auth.user.email).await?;

    let reply = state.chat.respond(
        &request.message,
        &ChatContext {
            watchlist: &watchlist,
            portfolio: &portfolio,
        },
    );
    tracing::debug!("Chat rule '{}' answered {}", reply.rule, auth.user.email);

    Ok(Json(ApiResponse::new(reply)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/chat", post(chat))
}
