//! Authentication Types
//!
//! Types for the mock email/password login. Any non-empty credentials are
//! accepted; the session token scopes ledger access to one user.

use serde::{Deserialize, Serialize};

/// A dashboard user, stored under `user:{email}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Normalized (trimmed, lower-cased) email; the ledger key
    pub email: String,
    /// Display name
    pub name: String,
    /// When the account was first seen (ms)
    pub created_at: i64,
}

impl User {
    pub fn new(email: &str, name: &str) -> Self {
        Self {
            email: email.to_string(),
            name: name.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Session stored under `session:{token}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session token
    pub token: String,
    /// Owning user's email
    pub email: String,
    /// When session was created (ms)
    pub created_at: i64,
    /// When session expires (ms)
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        chrono::Utc::now().timestamp_millis() >= self.expires_at
    }
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Successful login or signup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub session_token: String,
    /// When the session expires (ms)
    pub expires_at: i64,
    pub user: User,
}
