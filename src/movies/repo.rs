use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repo_types::{Movie, MovieFields};
use crate::error::StoreError;

const DUPLICATE_TITLE: &str = "Movie already exists";

/// The `movies` collection.
#[async_trait]
pub trait MovieStore: Send + Sync {
    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, StoreError>;
    async fn list(&self) -> Result<Vec<Movie>, StoreError>;
    async fn insert(&self, fields: MovieFields) -> Result<Movie, StoreError>;
    async fn replace(&self, id: Uuid, fields: MovieFields) -> Result<bool, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[derive(Clone)]
pub struct PgMovieStore {
    db: PgPool,
}

impl PgMovieStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovieStore for PgMovieStore {
    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"SELECT id, title, description, genre, created_at FROM movies WHERE title = $1"#,
        )
        .bind(title)
        .fetch_optional(&self.db)
        .await
        .context("find movie by title")?;
        Ok(movie)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"SELECT id, title, description, genre, created_at FROM movies WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find movie by id")?;
        Ok(movie)
    }

    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, created_at
              FROM movies
             ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list movies")?;
        Ok(movies)
    }

    async fn insert(&self, fields: MovieFields) -> Result<Movie, StoreError> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (id, title, description, genre)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, genre, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.genre)
        .fetch_one(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx(e, DUPLICATE_TITLE, "insert movie"))?;
        Ok(movie)
    }

    async fn replace(&self, id: Uuid, fields: MovieFields) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"UPDATE movies SET title = $2, description = $3, genre = $4 WHERE id = $1"#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.genre)
        .execute(&self.db)
        .await
        .map_err(|e| StoreError::from_sqlx(e, DUPLICATE_TITLE, "update movie"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete movie")?;
        Ok(result.rows_affected() > 0)
    }
}

#[derive(Default)]
pub struct MemoryMovieStore {
    movies: RwLock<Vec<Movie>>,
}

#[async_trait]
impl MovieStore for MemoryMovieStore {
    async fn find_by_title(&self, title: &str) -> Result<Option<Movie>, StoreError> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| m.title == title).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        let movies = self.movies.read().await;
        Ok(movies.iter().find(|m| m.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        Ok(self.movies.read().await.clone())
    }

    async fn insert(&self, fields: MovieFields) -> Result<Movie, StoreError> {
        let mut movies = self.movies.write().await;
        if movies.iter().any(|m| m.title == fields.title) {
            return Err(StoreError::Conflict(DUPLICATE_TITLE.into()));
        }
        let movie = Movie {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            genre: fields.genre,
            created_at: OffsetDateTime::now_utc(),
        };
        movies.push(movie.clone());
        Ok(movie)
    }

    async fn replace(&self, id: Uuid, fields: MovieFields) -> Result<bool, StoreError> {
        let mut movies = self.movies.write().await;
        let Some(pos) = movies.iter().position(|m| m.id == id) else {
            return Ok(false);
        };
        if movies.iter().any(|m| m.id != id && m.title == fields.title) {
            return Err(StoreError::Conflict(DUPLICATE_TITLE.into()));
        }
        let movie = &mut movies[pos];
        movie.title = fields.title;
        movie.description = fields.description;
        movie.genre = fields.genre;
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut movies = self.movies.write().await;
        let before = movies.len();
        movies.retain(|m| m.id != id);
        Ok(movies.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str) -> MovieFields {
        MovieFields {
            title: title.into(),
            description: Some("a film".into()),
            genre: Some("drama".into()),
        }
    }

    #[tokio::test]
    async fn insert_list_and_find() {
        let store = MemoryMovieStore::default();
        let first = store.insert(fields("Heat")).await.unwrap();
        let second = store.insert(fields("Ran")).await.unwrap();
        let all = store.list().await.unwrap();
        assert_eq!(
            all.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(store.find_by_title("Ran").await.unwrap().unwrap().id, second.id);
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_title_conflicts() {
        let store = MemoryMovieStore::default();
        store.insert(fields("Heat")).await.unwrap();
        let err = store.insert(fields("Heat")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref m) if m == DUPLICATE_TITLE));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn replace_is_wholesale() {
        let store = MemoryMovieStore::default();
        let movie = store.insert(fields("Heat")).await.unwrap();
        let new = MovieFields {
            title: "Heat (1995)".into(),
            description: None,
            genre: Some("crime".into()),
        };
        assert!(store.replace(movie.id, new.clone()).await.unwrap());
        let stored = store.find_by_id(movie.id).await.unwrap().unwrap();
        assert_eq!(stored.title, new.title);
        assert_eq!(stored.description, None);
        assert_eq!(stored.genre.as_deref(), Some("crime"));
    }

    #[tokio::test]
    async fn replace_keeping_own_title_is_allowed() {
        let store = MemoryMovieStore::default();
        let movie = store.insert(fields("Heat")).await.unwrap();
        assert!(store.replace(movie.id, fields("Heat")).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_id_wins_over_taken_title() {
        let store = MemoryMovieStore::default();
        store.insert(fields("Heat")).await.unwrap();
        assert!(!store.replace(Uuid::new_v4(), fields("Heat")).await.unwrap());
    }

    #[tokio::test]
    async fn unknown_id_leaves_collection_unchanged() {
        let store = MemoryMovieStore::default();
        store.insert(fields("Heat")).await.unwrap();
        assert!(!store.replace(Uuid::new_v4(), fields("Ran")).await.unwrap());
        assert!(!store.delete(Uuid::new_v4()).await.unwrap());
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Heat");
    }
}
