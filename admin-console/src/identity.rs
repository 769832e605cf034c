//! Who is signed in, as seen by the header of every screen.
//!
//! A binding starts in [`IdentityState::Loading`] and settles exactly once
//! per mount into `Authenticated` or `Anonymous`. Only the presence of a
//! token decides whether a profile is trusted.

use crate::navigation::{Navigator, SIGN_IN_ROUTE};
use crate::services::AuthClient;
use api_core::reqwest::StatusCode;
use api_core::{ApiError, ErrorKind, SessionStore, UserProfile};
use std::sync::Arc;

pub const GUEST_DISPLAY_NAME: &str = "Guest User";
pub const GUEST_INITIALS: &str = "GU";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    Loading,
    Authenticated(UserProfile),
    Anonymous,
}

/// How a mount settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    /// Token and cached profile present; no request made.
    Cached,
    /// Profile fetched and cached.
    Fetched,
    /// No token; no request made.
    NoToken,
    /// Server refused the token. The session was cleared.
    Rejected,
    /// Server could not be reached or failed. The session was kept.
    Unreachable,
}

pub struct IdentityBinding {
    auth: AuthClient,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    state: IdentityState,
    outcome: Option<MountOutcome>,
}

impl IdentityBinding {
    pub fn new(
        auth: AuthClient,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            auth,
            session,
            navigator,
            state: IdentityState::Loading,
            outcome: None,
        }
    }

    pub fn state(&self) -> &IdentityState {
        &self.state
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.state {
            IdentityState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.profile().is_some()
    }

    pub fn display_name(&self) -> &str {
        self.profile()
            .map(|profile| profile.display_name.as_str())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(GUEST_DISPLAY_NAME)
    }

    pub fn initials(&self) -> String {
        self.profile()
            .map(UserProfile::initials)
            .unwrap_or_else(|| GUEST_INITIALS.to_string())
    }

    /// Resolves the identity for this mount. Calling it again after the
    /// binding has settled returns the first outcome without any I/O.
    pub async fn mount(&mut self) -> MountOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }

        let outcome = self.resolve().await;
        self.outcome = Some(outcome);
        outcome
    }

    async fn resolve(&mut self) -> MountOutcome {
        if self.session.token().is_none() {
            self.state = IdentityState::Anonymous;
            return MountOutcome::NoToken;
        }

        if let Some(profile) = self.session.cached_profile() {
            self.state = IdentityState::Authenticated(profile);
            return MountOutcome::Cached;
        }

        match self.auth.profile().await {
            Ok(profile) => {
                if let Err(e) = self.session.set_cached_profile(profile.clone()) {
                    tracing::warn!(error = %e, "Failed to cache user profile");
                }
                self.state = IdentityState::Authenticated(profile);
                MountOutcome::Fetched
            }
            Err(e) if invalidates_session(&e) => {
                tracing::warn!(error = %e, "Profile fetch rejected the session token");
                if let Err(e) = self.session.clear() {
                    tracing::error!(error = %e, "Failed to clear rejected session");
                }
                self.state = IdentityState::Anonymous;
                MountOutcome::Rejected
            }
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "Error fetching user details");
                self.state = IdentityState::Anonymous;
                MountOutcome::Unreachable
            }
        }
    }

    /// Signs out. The server call is best effort; the local session is
    /// cleared and the sign-in screen shown regardless of its result.
    pub async fn logout(&mut self) {
        if let Err(e) = self.auth.logout().await {
            tracing::error!(error = %e, "Error during logout");
        }

        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session during logout");
        }
        self.state = IdentityState::Anonymous;
        self.navigator.navigate(SIGN_IN_ROUTE);
    }
}

/// A refusal of the token itself, as opposed to a failure to reach or
/// interpret the server.
fn invalidates_session(err: &ApiError) -> bool {
    matches!(err.kind(), ErrorKind::Unauthorized | ErrorKind::Rejected)
        || err.status() == Some(StatusCode::FORBIDDEN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_refusals_invalidate_the_session() {
        let unauthorized = ApiError::Status {
            status: StatusCode::UNAUTHORIZED,
            body: json!({"message": "Unauthenticated."}),
        };
        let forbidden = ApiError::Status {
            status: StatusCode::FORBIDDEN,
            body: json!(null),
        };
        let rejected = ApiError::Rejected { message: None };
        assert!(invalidates_session(&unauthorized));
        assert!(invalidates_session(&forbidden));
        assert!(invalidates_session(&rejected));

        let outage = ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: json!(null),
        };
        assert!(!invalidates_session(&outage));
        assert!(!invalidates_session(&ApiError::Decode("bad".to_string())));
        assert!(!invalidates_session(&ApiError::Cancelled));
    }
}
