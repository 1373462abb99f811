/**
 * Authentication Service
 *
 * Mock email/password login for the dashboard. Any non-empty credentials
 * are accepted; the session token scopes every ledger operation to a user.
 *
 * Storage:
 * - Key-value store: users (`user:{email}`) and sessions (`session:{token}`)
 * - DashMap: in-memory session cache, refilled lazily from the store
 */

use crate::services::kv_store::{KeyValueStore, StoreError};
use crate::types::{AuthResponse, Session, User};
use chrono::Duration;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

fn user_key(email: &str) -> String {
    format!("user:{}", email)
}

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Authentication service for sessions and users.
#[derive(Clone)]
pub struct AuthService {
    /// Active sessions (session_token -> Session)
    sessions: Arc<DashMap<String, Session>>,
    store: Arc<dyn KeyValueStore>,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(store: Arc<dyn KeyValueStore>, session_ttl_hours: i64) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            store,
            session_ttl: Duration::hours(session_ttl_hours),
        }
    }

    /// Log in with any non-empty email and password. The display name is the
    /// part of the email before `@` unless the user signed up with one.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = validate_credentials(email, password)?;

        let user = match self.load_user(&email)? {
            Some(user) => user,
            None => {
                let name = email.split('@').next().unwrap_or(&email).to_string();
                let user = User::new(&email, &name);
                self.save_user(&user)?;
                user
            }
        };

        self.open_session(user)
    }

    /// Sign up with an explicit display name.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, AuthError> {
        let email = validate_credentials(email, password)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let user = match self.load_user(&email)? {
            Some(existing) => User {
                name: name.to_string(),
                ..existing
            },
            None => User::new(&email, name),
        };
        self.save_user(&user)?;
        info!("Signed up {}", user.email);

        self.open_session(user)
    }

    /// Validate a session token.
    pub async fn validate_session(&self, token: &str) -> Result<User, AuthError> {
        // Clone out of the map so no shard lock is held below.
        let cached = self.sessions.get(token).map(|s| s.clone());

        let session = match cached {
            Some(session) => session,
            None => {
                let session = self.load_session(token)?.ok_or(AuthError::Unauthorized)?;
                self.sessions.insert(token.to_string(), session.clone());
                session
            }
        };

        if session.is_expired() {
            self.evict(token);
            return Err(AuthError::SessionExpired);
        }

        self.load_user(&session.email)?
            .ok_or(AuthError::Unauthorized)
    }

    /// Logout - invalidate session. Returns the session's owner, if any.
    pub async fn logout(&self, token: &str) -> Option<String> {
        let email = self
            .sessions
            .get(token)
            .map(|s| s.email.clone())
            .or_else(|| self.load_session(token).ok().flatten().map(|s| s.email));

        self.evict(token);
        if let Some(ref email) = email {
            info!("Logged out {}", email);
        }
        email
    }

    /// Number of cached sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // Persistence helpers

    fn open_session(&self, user: User) -> Result<AuthResponse, AuthError> {
        let now = chrono::Utc::now();
        let session = Session {
            token: uuid::Uuid::new_v4().to_string(),
            email: user.email.clone(),
            created_at: now.timestamp_millis(),
            expires_at: (now + self.session_ttl).timestamp_millis(),
        };

        let raw = serde_json::to_string(&session).map_err(StoreError::from)?;
        self.store.set(&session_key(&session.token), &raw)?;
        self.sessions.insert(session.token.clone(), session.clone());
        debug!("Opened session for {}", user.email);

        Ok(AuthResponse {
            session_token: session.token,
            expires_at: session.expires_at,
            user,
        })
    }

    fn evict(&self, token: &str) {
        self.sessions.remove(token);
        if let Err(e) = self.store.remove(&session_key(token)) {
            warn!("Failed to remove session from store: {}", e);
        }
    }

    fn load_session(&self, token: &str) -> Result<Option<Session>, AuthError> {
        match self.store.get(&session_key(token))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(StoreError::from)?)),
            None => Ok(None),
        }
    }

    fn load_user(&self, email: &str) -> Result<Option<User>, AuthError> {
        match self.store.get(&user_key(email))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(StoreError::from)?)),
            None => Ok(None),
        }
    }

    fn save_user(&self, user: &User) -> Result<(), AuthError> {
        let raw = serde_json::to_string(user).map_err(StoreError::from)?;
        self.store.set(&user_key(&user.email), &raw)?;
        Ok(())
    }
}

/// Trim and lower-case the email; both fields must be non-empty.
fn validate_credentials(email: &str, password: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || password.trim().is_empty() {
        return Err(AuthError::InvalidCredentials);
    }
    Ok(email)
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Session expired")]
    SessionExpired,

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl axum::response::IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            AuthError::InvalidCredentials => {
                (axum::http::StatusCode::BAD_REQUEST, "INVALID_CREDENTIALS")
            }
            AuthError::Unauthorized | AuthError::SessionExpired => {
                (axum::http::StatusCode::UNAUTHORIZED, "UNAUTHORIZED")
            }
            AuthError::Storage(_) => {
                (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
