use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::dto::{MessageResponse, PublicUser, UpdateUserRequest};
use crate::{error::ApiError, state::AppState, validation::parse_id};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublicUser>, ApiError> {
    let id = parse_id(&id)?;
    match state.users.find_by_id(id).await? {
        Some(user) => Ok(Json(user.into())),
        None => Err(ApiError::NotFound("User not found".into())),
    }
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    let Json(payload) = payload?;
    let changes = payload.validate().inspect_err(|e| warn!(error = %e, "invalid user update"))?;

    if !state.users.update(id, changes).await? {
        warn!(%id, "update on unknown user");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(%id, "user updated");
    Ok(Json(MessageResponse {
        message: "User updated successfully",
    }))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_id(&id)?;
    if !state.users.delete(id).await? {
        warn!(%id, "delete on unknown user");
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(%id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}
