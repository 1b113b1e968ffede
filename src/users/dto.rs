use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{User, UserChanges, UserProfile};
use crate::{error::ApiError, validation::normalize_email};

/// Public part of the user returned to clients. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub user_status: Option<String>,
    pub gender: Option<String>,
    pub membership_type: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            username: u.username,
            user_status: u.user_status,
            gender: u.gender,
            membership_type: u.membership_type,
            bio: u.bio,
            date_of_birth: u.date_of_birth,
            created_at: u.created_at,
        }
    }
}

/// Body of `PUT /users/{id}`. Absent profile fields are cleared.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
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

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserChanges, ApiError> {
        Ok(UserChanges {
            username: normalize_email(self.email)?,
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

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "A".into(),
            username: "a@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            user_status: Some("active".into()),
            gender: None,
            membership_type: None,
            bio: None,
            date_of_birth: Some("1990-01-01".into()),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(json["username"], "a@x.com");
        assert_eq!(json["user_status"], "active");
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn update_requires_email() {
        let req: UpdateUserRequest = serde_json::from_str(r#"{"bio": "hi"}"#).unwrap();
        assert!(matches!(req.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn update_normalizes_email_and_keeps_nulls() {
        let req: UpdateUserRequest =
            serde_json::from_str(r#"{"email": " B@X.com ", "gender": "m"}"#).unwrap();
        let changes = req.validate().unwrap();
        assert_eq!(changes.username, "b@x.com");
        assert_eq!(changes.profile.gender.as_deref(), Some("m"));
        assert_eq!(changes.profile.bio, None);
    }
}
