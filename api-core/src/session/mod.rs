//! Client-held session: the auth token and the cached user profile.
//!
//! The token is the only proof of authentication. The profile is a display
//! cache and is never consulted to decide whether a user is signed in.

mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use chrono::{DateTime, Duration, Utc};
use secrecy::Secret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the cookie holding the bearer token.
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// Key of the durable profile entry.
pub const USER_DATA_KEY: &str = "user_data";

pub const AUTH_TOKEN_TTL_DAYS: i64 = 7;

pub fn auth_token_ttl() -> Duration {
    Duration::days(AUTH_TOKEN_TTL_DAYS)
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Identity snapshot returned by the profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(
        rename = "profile_photo_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_path: Option<String>,
}

impl UserProfile {
    /// Up to two upper-cased initials, one per word of the display name.
    pub fn initials(&self) -> String {
        let initials: String = self
            .display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();

        if initials.is_empty() {
            "GU".to_string()
        } else {
            initials
        }
    }
}

/// Single source of truth for "am I authenticated, and as whom".
///
/// Shared as `Arc<dyn SessionStore>` between the HTTP client (reads the
/// token on every call) and the flows that sign in and out.
pub trait SessionStore: Send + Sync {
    /// The current token, or `None` when absent or expired.
    fn token(&self) -> Option<Secret<String>>;

    fn set_token(&self, token: Secret<String>, ttl: Duration) -> Result<(), SessionError>;

    fn cached_profile(&self) -> Option<UserProfile>;

    /// Replaces the cached profile wholesale.
    fn set_cached_profile(&self, profile: UserProfile) -> Result<(), SessionError>;

    /// Removes both the token and the cached profile. Readers observe either
    /// the full session or nothing.
    fn clear(&self) -> Result<(), SessionError>;
}

/// Cookie-shaped token record, scoped to the whole origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenCookie {
    pub fn new(value: String, ttl: Duration) -> Self {
        Self {
            name: AUTH_TOKEN_COOKIE.to_string(),
            value,
            path: "/".to_string(),
            expires_at: Utc::now() + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// In-memory view shared by both store implementations.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub token: Option<TokenCookie>,
    pub profile: Option<UserProfile>,
}

impl SessionState {
    pub fn live_token(&self) -> Option<Secret<String>> {
        self.token
            .as_ref()
            .filter(|cookie| !cookie.is_expired())
            .map(|cookie| Secret::new(cookie.value.clone()))
    }
}
