/**
 * Authentication API
 *
 * Mock email/password login. Any non-empty credentials are accepted.
 *
 * - POST /api/auth/login - `{email, password}`, returns a session token
 * - POST /api/auth/signup - `{email, password, name}`, returns a session token
 * - GET /api/auth/me - Current user (requires auth)
 * - POST /api/auth/logout - Invalidate the session (requires auth)
 */

use axum::{
    extract::{FromRef, FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::warn;

use crate::api::ApiResponse;
use crate::services::AuthError;
use crate::types::{AuthResponse, LoginRequest, SignupRequest, User};
use crate::AppState;

/// Create auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/me", get(get_me))
        .route("/logout", post(logout))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let response = state.auth.login(&request.email, &request.password).await?;
    Ok(Json(ApiResponse::new(response)))
}

/// POST /api/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AuthError> {
    let response = state
        .auth
        .signup(&request.email, &request.password, &request.name)
        .await?;
    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/auth/me
async fn get_me(auth: Authenticated) -> Json<ApiResponse<User>> {
    Json(ApiResponse::new(auth.user))
}

/// POST /api/auth/logout
///
/// With `RESET_ON_LOGOUT` the user's ledger is cleared as well.
async fn logout(
    State(state): State<AppState>,
    auth: Authenticated,
) -> Json<ApiResponse<LogoutResponse>> {
    state.auth.logout(&auth.token).await;

    if state.config.reset_on_logout {
        if let Err(e) = state.trading.reset(&auth.user.email).await {
            warn!("Failed to reset ledger on logout for {}: {}", auth.user.email, e);
        }
    }

    Json(ApiResponse::new(LogoutResponse { success: true }))
}

/// Authenticated user extractor.
///
/// Reads `Authorization: Bearer <token>` and resolves the session:
/// ```ignore
/// async fn my_handler(auth: Authenticated) -> impl IntoResponse {
///     let email = auth.user.email;
///     // ...
/// }
/// ```
pub struct Authenticated {
    pub user: User,
    pub token: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let token = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let user = state.auth.validate_session(token).await?;

        Ok(Authenticated {
            user,
            token: token.to_string(),
        })
    }
}

/// Logout response.
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}
