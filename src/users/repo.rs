use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserChanges};
use crate::error::StoreError;

const DUPLICATE_USERNAME: &str = "Username already exists";

/// The `users` collection.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    /// Fails with [`StoreError::Conflict`] when the username is taken.
    async fn insert(&self, new: NewUser) -> Result<User, StoreError>;
    /// Returns `false` when no user has this id.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<bool, StoreError>;
    /// Returns `false` when nothing was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

const USER_COLUMNS: &str = "id, name, username, password_hash, user_status, gender, \
                            membership_type, bio, date_of_birth, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(users)
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, username, password_hash, user_status, gender,
                               membership_type, bio, date_of_birth)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(&new.profile.user_status)
        .bind(&new.profile.gender)
        .bind(&new.profile.membership_type)
        .bind(&new.profile.bio)
        .bind(&new.profile.date_of_birth)
        .fetch_one(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx(e, DUPLICATE_USERNAME, "insert user"))?;
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
               SET username = $2, user_status = $3, gender = $4,
                   membership_type = $5, bio = $6, date_of_birth = $7
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.profile.user_status)
        .bind(&changes.profile.gender)
        .bind(&changes.profile.membership_type)
        .bind(&changes.profile.bio)
        .bind(&changes.profile.date_of_birth)
        .execute(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx(e, DUPLICATE_USERNAME, "update user"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected() > 0)
    }
}

/// Process-local store, kept in insertion order.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn insert(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == new.username) {
            return Err(StoreError::Conflict(DUPLICATE_USERNAME.into()));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            username: new.username,
            password_hash: new.password_hash,
            user_status: new.profile.user_status,
            gender: new.profile.gender,
            membership_type: new.profile.membership_type,
            bio: new.profile.bio,
            date_of_birth: new.profile.date_of_birth,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let Some(pos) = users.iter().position(|u| u.id == id) else {
            return Ok(false);
        };
        if users
            .iter()
            .any(|u| u.id != id && u.username == changes.username)
        {
            return Err(StoreError::Conflict(DUPLICATE_USERNAME.into()));
        }
        let user = &mut users[pos];
        let profile = changes.profile;
        user.username = changes.username;
        user.user_status = profile.user_status;
        user.gender = profile.gender;
        user.membership_type = profile.membership_type;
        user.bio = profile.bio;
        user.date_of_birth = profile.date_of_birth;
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::UserProfile;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            name: "A".into(),
            username: username.into(),
            password_hash: "$argon2id$stub".into(),
            profile: UserProfile {
                bio: Some("likes westerns".into()),
                ..UserProfile::default()
            },
        }
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = MemoryUserStore::default();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        let by_name = store.find_by_username("a@x.com").await.unwrap().unwrap();
        let by_id = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert_eq!(by_id.bio.as_deref(), Some("likes westerns"));
        assert!(store.find_by_username("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_username() {
        let store = MemoryUserStore::default();
        let first = store.insert(new_user("a@x.com")).await.unwrap();
        let err = store.insert(new_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        let users = store.list().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, first.id);
    }

    #[tokio::test]
    async fn update_overwrites_profile_wholesale() {
        let store = MemoryUserStore::default();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        let changes = UserChanges {
            username: "new@x.com".into(),
            profile: UserProfile {
                gender: Some("f".into()),
                ..UserProfile::default()
            },
        };
        assert!(store.update(user.id, changes).await.unwrap());
        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.username, "new@x.com");
        assert_eq!(stored.gender.as_deref(), Some("f"));
        assert_eq!(stored.bio, None);
        assert_eq!(stored.name, "A");
    }

    #[tokio::test]
    async fn update_to_taken_username_conflicts() {
        let store = MemoryUserStore::default();
        store.insert(new_user("a@x.com")).await.unwrap();
        let b = store.insert(new_user("b@x.com")).await.unwrap();
        let changes = UserChanges {
            username: "a@x.com".into(),
            profile: UserProfile::default(),
        };
        let err = store.update(b.id, changes).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_id_wins_over_taken_username() {
        let store = MemoryUserStore::default();
        store.insert(new_user("a@x.com")).await.unwrap();
        let changes = UserChanges {
            username: "a@x.com".into(),
            profile: UserProfile::default(),
        };
        assert!(!store.update(Uuid::new_v4(), changes).await.unwrap());
    }

    #[tokio::test]
    async fn missing_id_reports_false() {
        let store = MemoryUserStore::default();
        store.insert(new_user("a@x.com")).await.unwrap();
        let changes = UserChanges {
            username: "z@x.com".into(),
            profile: UserProfile::default(),
        };
        assert!(!store.update(Uuid::new_v4(), changes).await.unwrap());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let store = MemoryUserStore::default();
        let user = store.insert(new_user("a@x.com")).await.unwrap();
        assert!(store.delete(user.id).await.unwrap());
        assert!(store.find_by_id(user.id).await.unwrap().is_none());
    }
}
