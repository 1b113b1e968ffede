use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Movie, MovieFields};
use crate::{error::ApiError, validation::required};

#[derive(Debug, Serialize)]
pub struct MovieResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Movie> for MovieResponse {
    fn from(m: Movie) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            genre: m.genre,
            created_at: m.created_at,
        }
    }
}

/// Body of both `POST /api/movies` and `PUT /api/movies/{id}`.
#[derive(Debug, Deserialize)]
pub struct MovieRequest {
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
}

impl MovieRequest {
    pub fn validate(self) -> Result<MovieFields, ApiError> {
        Ok(MovieFields {
            title: required("title", self.title)
                .map_err(|_| ApiError::Validation("Movie title is required".into()))?,
            description: self.description,
            genre: self.genre,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedMovieResponse {
    pub message: &'static str,
    pub movie_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
