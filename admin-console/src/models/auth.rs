use api_core::UserProfile;
use secrecy::Secret;
use serde::Deserialize;

/// `data` payload of the sign-in and invitation registration responses.
#[derive(Debug, Deserialize)]
pub struct AuthSession {
    pub access_token: Secret<String>,
    pub user: UserProfile,
}

/// Who an invitation was issued to, shown before the invitee registers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, Deserialize)]
pub struct InvitationDetails {
    pub email: String,
    pub client_name: String,
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    #[test]
    fn token_is_kept_secret() {
        let session: AuthSession = serde_json::from_value(json!({
            "access_token": "T1",
            "user": {"id": 1, "name": "A"}
        }))
        .unwrap();

        assert_eq!(session.access_token.expose_secret(), "T1");
        assert!(!format!("{:?}", session).contains("T1"));
    }
}
