use super::{SessionError, SessionState, SessionStore, TokenCookie, UserProfile};
use chrono::Duration;
use secrecy::{ExposeSecret, Secret};
use std::sync::{PoisonError, RwLock};

/// Process-local session. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: RwLock<SessionState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds a token and, optionally, a cached profile.
    pub fn with_session(token: &str, profile: Option<UserProfile>) -> Self {
        Self {
            state: RwLock::new(SessionState {
                token: Some(TokenCookie::new(token.to_string(), super::auth_token_ttl())),
                profile,
            }),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<Secret<String>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .live_token()
    }

    fn set_token(&self, token: Secret<String>, ttl: Duration) -> Result<(), SessionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.token = Some(TokenCookie::new(token.expose_secret().clone(), ttl));
        Ok(())
    }

    fn cached_profile(&self) -> Option<UserProfile> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile
            .clone()
    }

    fn set_cached_profile(&self, profile: UserProfile) -> Result<(), SessionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.profile = Some(profile);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = SessionState::default();
        Ok(())
    }
}
