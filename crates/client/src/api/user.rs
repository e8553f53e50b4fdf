//! Profile, password and user administration.

use petalbox_core::{Email, Identity, Role, extract_object};
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::{items_of, segment};
use crate::error::ApiError;
use crate::http::{ApiClient, RequestOptions};

const USER: &[&str] = &["user", "profile"];
const USERS: &[&str] = &["users"];

/// Editable profile fields; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct ResetRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetConfirm<'a> {
    token: &'a str,
    new_password: &'a str,
}

#[derive(Serialize)]
struct RoleBody {
    role: Role,
}

impl ApiClient {
    /// Fetch the signed-in user's live profile.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<Value, ApiError> {
        let response = self.get("/users/profile", RequestOptions::default()).await?;
        Ok(extract_object(response, USER))
    }

    /// Update the signed-in user's profile and merge the result into the session.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails or the session cannot be saved.
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Value, ApiError> {
        let response = self
            .put("/users/profile", update, RequestOptions::default())
            .await?;
        let profile = extract_object(response, USER);

        if let Some(mut identity) = self.session().identity() {
            identity.merge_profile(&profile);
            self.session().update_identity(identity)?;
        }
        Ok(profile)
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns error if the current password is wrong or the request fails.
    #[instrument(skip_all)]
    pub async fn change_password(&self, current: &str, new: &str) -> Result<(), ApiError> {
        let body = PasswordChange {
            current_password: current,
            new_password: new,
        };
        self.post("/users/change-password", &body, RequestOptions::default())
            .await?;
        Ok(())
    }

    /// Ask the backend to email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn request_password_reset(&self, email: &Email) -> Result<(), ApiError> {
        let body = ResetRequest {
            email: email.as_str(),
        };
        self.post("/users/reset-password/request", &body, RequestOptions::public())
            .await?;
        Ok(())
    }

    /// Set a new password using the token from a reset email.
    ///
    /// # Errors
    ///
    /// Returns error if the token is invalid or expired.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), ApiError> {
        let body = ResetConfirm {
            token,
            new_password,
        };
        self.post("/users/reset-password", &body, RequestOptions::public())
            .await?;
        Ok(())
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns error if the user is not found or the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &str) -> Result<Identity, ApiError> {
        let path = format!("/users/{}", segment(id));
        let response = self.get(&path, RequestOptions::default()).await?;
        Ok(Identity::new(extract_object(response, USER)))
    }

    /// Update a user's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self, changes), fields(user_id = %id))]
    pub async fn update_user(&self, id: &str, changes: &Value) -> Result<Identity, ApiError> {
        let path = format!("/users/{}", segment(id));
        let response = self.put(&path, changes, RequestOptions::default()).await?;
        Ok(Identity::new(extract_object(response, USER)))
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/users/{}", segment(id));
        self.delete(&path, RequestOptions::default()).await?;
        Ok(())
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<Identity>, ApiError> {
        let response = self.get("/users", RequestOptions::default()).await?;
        Ok(items_of(response, USERS)?
            .into_iter()
            .map(Identity::new)
            .collect())
    }

    /// Give a user a role.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self), fields(user_id = %id, role = %role))]
    pub async fn assign_role(&self, id: &str, role: Role) -> Result<(), ApiError> {
        let path = format!("/users/{}/role", segment(id));
        self.put(&path, &RoleBody { role }, RequestOptions::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_omits_unset_fields() {
        let update = ProfileUpdate {
            phone: Some("0903".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"phone": "0903"})
        );
    }

    #[test]
    fn test_password_change_is_camel_case() {
        let body = PasswordChange {
            current_password: "a",
            new_password: "b",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["currentPassword"], "a");
        assert_eq!(value["newPassword"], "b");
    }
}
