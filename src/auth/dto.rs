use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    users::repo_types::UserProfile,
    validation::{normalize_email, required},
};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub user_status: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub membership_type: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

/// Register input after validation; the password is still plaintext here.
pub struct Registration {
    pub name: String,
    pub username: String,
    pub password: String,
    pub profile: UserProfile,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<Registration, ApiError> {
        Ok(Registration {
            name: required("name", self.name)?,
            username: normalize_email(self.email)?,
            password: required_password(self.password)?,
            profile: UserProfile {
                user_status: self.user_status,
                gender: self.gender,
                membership_type: self.membership_type,
                bio: self.bio,
                date_of_birth: self.date_of_birth,
            },
        })
    }
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Only absence is a validation error here; a malformed email simply
    /// matches no account and ends up as bad credentials.
    pub fn validate(self) -> Result<(String, String), ApiError> {
        let email = required("email", self.email)?.to_lowercase();
        Ok((email, required_password(self.password)?))
    }
}

/// Request body for token refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

// Passwords are compared byte for byte, so they are never trimmed.
fn required_password(value: Option<String>) -> Result<String, ApiError> {
    value
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("password is required".into()))
}

#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub message: &'static str,
    pub user_id: Uuid,
}

/// Returned by login and refresh.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_requires_name() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"email": "a@x.com", "password": "p"}"#).unwrap();
        assert!(matches!(
            req.validate(),
            Err(ApiError::Validation(m)) if m == "name is required"
        ));
    }

    #[test]
    fn register_keeps_password_verbatim() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name": "A", "email": "A@x.com", "password": " p ", "bio": "hi"}"#,
        )
        .unwrap();
        let reg = req.validate().unwrap();
        assert_eq!(reg.username, "a@x.com");
        assert_eq!(reg.password, " p ");
        assert_eq!(reg.profile.bio.as_deref(), Some("hi"));
    }

    #[test]
    fn login_passes_malformed_email_through() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email": " NoPe ", "password": "p"}"#).unwrap();
        assert_eq!(req.validate().unwrap(), ("nope".to_string(), "p".to_string()));
        let req: LoginRequest = serde_json::from_str(r#"{"password": "p"}"#).unwrap();
        assert!(matches!(
            req.validate(),
            Err(ApiError::Validation(m)) if m == "email is required"
        ));
    }

    #[test]
    fn login_rejects_empty_password() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email": "a@x.com", "password": ""}"#).unwrap();
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }
}
