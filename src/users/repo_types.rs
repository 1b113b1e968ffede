use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the store.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Login identifier; always the normalized email.
    pub username: String,
    pub password_hash: String,
    pub user_status: Option<String>,
    pub gender: Option<String>,
    pub membership_type: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Fields written on register.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub password_hash: String,
    pub profile: UserProfile,
}

/// Mutable profile fields; an update overwrites all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub user_status: Option<String>,
    pub gender: Option<String>,
    pub membership_type: Option<String>,
    pub bio: Option<String>,
    pub date_of_birth: Option<String>,
}

/// Wholesale replacement applied by `PUT /users/{id}`.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub profile: UserProfile,
}
