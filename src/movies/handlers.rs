use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{CreatedMovieResponse, MessageResponse, MovieRequest, MovieResponse};
use crate::{error::ApiError, state::AppState, validation::parse_id};

pub fn movie_routes() -> Router<AppState> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/:id",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
}

const NOT_FOUND: &str = "Movie not found";

#[instrument(skip(state))]
pub async fn list_movies(
    State(state): State<AppState>,
) -> Result<Json<Vec<MovieResponse>>, ApiError> {
    let movies = state.movies.list().await?;
    Ok(Json(movies.into_iter().map(MovieResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MovieResponse>, ApiError> {
    let id = parse_id(&id)?;
    state
        .movies
        .find_by_id(id)
        .await?
        .map(|m| Json(m.into()))
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_movie(
    State(state): State<AppState>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedMovieResponse>), ApiError> {
    let Json(payload) = payload?;
    let fields = payload
        .validate()
        .inspect_err(|e| warn!(error = %e, "invalid movie"))?;

    if state.movies.find_by_title(&fields.title).await?.is_some() {
        warn!(title = %fields.title, "movie already exists");
        return Err(ApiError::Conflict("Movie already exists".into()));
    }

    let movie = state.movies.insert(fields).await?;
    info!(movie_id = %movie.id, title = %movie.title, "movie created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedMovieResponse {
            message: "Movie created",
            movie_id: movie.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<MovieRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let fields = payload
        .validate()
        .inspect_err(|e| warn!(error = %e, "invalid movie"))?;

    if !state.movies.replace(id, fields).await? {
        warn!(%id, "update on unknown movie");
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }

    info!(%id, "movie updated");
    Ok(Json(MessageResponse {
        message: "Movie updated",
    }))
}

#[instrument(skip(state))]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !state.movies.delete(id).await? {
        warn!(%id, "delete on unknown movie");
        return Err(ApiError::NotFound(NOT_FOUND.into()));
    }

    info!(%id, "movie deleted");
    Ok(Json(MessageResponse {
        message: "Movie deleted",
    }))
}
