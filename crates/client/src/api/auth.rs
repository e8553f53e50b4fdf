//! Sign-in, registration and token verification.

use petalbox_core::{Email, Identity, Payload, Role, extract_object};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use crate::error::ApiError;
use crate::http::{ApiClient, RequestOptions};

const TOKEN: &[&str] = &[
    "token",
    "accessToken",
    "access_token",
    "data.token",
    "data.accessToken",
];
const USER: &[&str] = &["user", "profile", "account"];

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct GoogleBody<'a> {
    credential: &'a str,
}

/// New account details.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: Email,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("role", &self.role)
            .finish()
    }
}

impl ApiClient {
    /// Sign in with email and password and store the session.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized { session_cleared: false }` on bad credentials,
    /// or `Decode` if the response carries no token.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &Email, password: &str) -> Result<Identity, ApiError> {
        let body = LoginBody {
            email: email.as_str(),
            password,
        };
        let response = self
            .post("/auth/login", &body, RequestOptions::public())
            .await?;
        let identity = self.store_session(response, false)?;
        tracing::info!(user_id = ?identity.id(), role = ?identity.highest_role(), "Logged in");
        Ok(identity)
    }

    /// Create an account. Signs in when the backend returns a token.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the registration.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<Option<Identity>, ApiError> {
        let response = self
            .post("/auth/register", request, RequestOptions::public())
            .await?;
        if Payload::new(&response).text(TOKEN).is_none() {
            return Ok(None);
        }
        self.store_session(response, false).map(Some)
    }

    /// Sign in with a Google ID token credential and store the session.
    ///
    /// The identity is marked third-party, which exempts it from the
    /// sign-out-on-401 policy.
    ///
    /// # Errors
    ///
    /// Returns error if the backend rejects the credential.
    #[instrument(skip(self, credential))]
    pub async fn google_login(&self, credential: &str) -> Result<Identity, ApiError> {
        let response = self
            .post("/auth/google", &GoogleBody { credential }, RequestOptions::public())
            .await?;
        self.store_session(response, true)
    }

    /// Check the stored token with the backend and return the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the token is no longer valid.
    #[instrument(skip(self))]
    pub async fn verify_token(&self) -> Result<Identity, ApiError> {
        let response = self.get("/auth/verify", RequestOptions::default()).await?;
        Ok(Identity::new(extract_object(response, USER)))
    }

    /// Forget the local session. No backend call is made.
    ///
    /// # Errors
    ///
    /// Returns error if the stored session cannot be removed.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session().sign_out()?;
        tracing::info!("Logged out");
        Ok(())
    }

    fn store_session(&self, response: Value, third_party: bool) -> Result<Identity, ApiError> {
        let token = Payload::new(&response)
            .text(TOKEN)
            .ok_or_else(|| ApiError::Decode("sign-in response carried no token".to_string()))?;

        let mut identity = Identity::new(user_of(response));
        if third_party {
            identity.mark_third_party();
        }
        self.session().sign_in(token, identity.clone())?;
        Ok(identity)
    }
}

/// The user object from a sign-in response (`user`, `data.user` or `data`).
fn user_of(response: Value) -> Value {
    let unwrapped = extract_object(response, &["data"]);
    let mut user = extract_object(unwrapped, USER);
    if let Value::Object(map) = &mut user {
        for key in ["token", "accessToken", "access_token", "refreshToken", "success"] {
            map.remove(key);
        }
    }
    user
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_user_of_shapes() {
        assert_eq!(
            user_of(json!({"token": "t", "user": {"id": 1}})),
            json!({"id": 1})
        );
        assert_eq!(
            user_of(json!({"success": true, "data": {"token": "t", "user": {"id": 2}}})),
            json!({"id": 2})
        );
        assert_eq!(
            user_of(json!({"data": {"id": 3, "role": "staff", "token": "t"}})),
            json!({"id": 3, "role": "staff"})
        );
    }

    #[test]
    fn test_register_request_serializes_role() {
        let request = RegisterRequest {
            name: "Lan".into(),
            email: Email::parse("lan@petalbox.shop").unwrap(),
            password: "secret1".into(),
            phone: None,
            role: Role::Customer,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["role"], "customer");
        assert_eq!(body["email"], "lan@petalbox.shop");
        assert!(body.get("phone").is_none());
    }
}
