use crate::models::{AuthSession, InvitationDetails};
use api_core::session::auth_token_ttl;
use api_core::{ApiClient, ApiError, UserProfile};
use secrecy::Secret;
use serde::Serialize;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Validate)]
pub struct SignInRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Built from the `token` and `email` query parameters of the emailed link.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Validate)]
pub struct AcceptInvitationRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub password_confirmation: String,
}

/// Sign-in, password and invitation flows. The flows that yield a token
/// write it, together with the profile, into the session store.
#[derive(Clone)]
pub struct AuthClient {
    api: ApiClient,
}

impl AuthClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<UserProfile, ApiError> {
        request.validate()?;

        let session: AuthSession = self
            .api
            .post_json("auth/login", request)
            .await?
            .into_data("data")?;

        let profile = self.establish(session)?;
        tracing::info!(user_id = profile.id, "Signed in");
        Ok(profile)
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.api.post("auth/profile", None).await?.into_data("data")
    }

    /// The signed-in user as returned by the generic user endpoint.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.api.get("user", &[]).await?.into_data("data")
    }

    /// Invalidates the token server-side. Does not touch the local session.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.api.post("auth/logout", None).await?;
        Ok(())
    }

    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<Option<String>, ApiError> {
        request.validate()?;
        self.api
            .post_json("auth/forgot-password", request)
            .await?
            .into_message()
    }

    /// Resets the password. When the server also hands back a token and
    /// user, the session is established from them.
    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<Option<String>, ApiError> {
        request.validate()?;

        let envelope = self
            .api
            .post_json("auth/reset-password", request)
            .await?
            .ensure_success()?;

        let token = envelope.optional::<String>("access_token")?;
        let user = envelope.optional::<UserProfile>("user")?;
        if let (Some(access_token), Some(user)) = (token, user) {
            self.establish(AuthSession {
                access_token: Secret::new(access_token),
                user,
            })?;
        }

        Ok(envelope.message().map(str::to_string))
    }

    pub async fn verify_invitation(&self, token: &str) -> Result<InvitationDetails, ApiError> {
        self.api
            .get(&invitation_path(token, "verify")?, &[])
            .await?
            .into_data("data")
    }

    pub async fn accept_invitation(
        &self,
        token: &str,
        request: &AcceptInvitationRequest,
    ) -> Result<UserProfile, ApiError> {
        request.validate()?;

        let session: AuthSession = self
            .api
            .post_json(&invitation_path(token, "register")?, request)
            .await?
            .into_data("data")?;

        let profile = self.establish(session)?;
        tracing::info!(user_id = profile.id, "Invitation accepted");
        Ok(profile)
    }

    fn establish(&self, session: AuthSession) -> Result<UserProfile, ApiError> {
        let store = self.api.session();
        store.set_token(session.access_token, auth_token_ttl())?;
        store.set_cached_profile(session.user.clone())?;
        Ok(session.user)
    }
}

/// Invitation tokens become a path segment, so only URL-safe characters
/// are accepted.
fn invitation_path(token: &str, action: &str) -> Result<String, ApiError> {
    let valid = !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(ApiError::InvalidRequest(format!(
            "invalid invitation token `{}`",
            token
        )));
    }
    Ok(format!("auth/invitations/{}/{}", token, action))
}
