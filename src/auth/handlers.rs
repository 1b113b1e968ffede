use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        LoginRequest, ProtectedResponse, RefreshRequest, RegisterRequest, RegisteredResponse,
        TokenResponse,
    },
    extractors::AuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
};
use crate::{error::ApiError, state::AppState, users::repo_types::NewUser};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/protected", get(protected))
}

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisteredResponse>), ApiError> {
    let Json(payload) = payload?;
    let reg = payload
        .validate()
        .inspect_err(|e| warn!(error = %e, "invalid registration"))?;

    // Ensure email is not taken
    if state.users.find_by_username(&reg.username).await?.is_some() {
        warn!(email = %reg.username, "email already registered");
        return Err(ApiError::Conflict("Username already exists".into()));
    }

    let password_hash = hash_password(&reg.password)?;
    let user = state
        .users
        .insert(NewUser {
            name: reg.name,
            username: reg.username,
            password_hash,
            profile: reg.profile,
        })
        .await?;

    info!(user_id = %user.id, email = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisteredResponse {
            message: "User registered successfully",
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let (email, password) = payload.validate()?;

    let Some(user) = state.users.find_by_username(&email).await? else {
        warn!(%email, "login unknown email");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.into()));
    }

    let tokens = issue_tokens(&JwtKeys::from_ref(&state), user.id)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(tokens))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = payload?;
    let token = payload
        .refresh_token
        .ok_or_else(|| ApiError::Validation("refresh_token is required".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        ApiError::Unauthorized("Invalid or expired refresh token".into())
    })?;

    if state.users.find_by_id(claims.sub).await?.is_none() {
        warn!(user_id = %claims.sub, "refresh for deleted user");
        return Err(ApiError::Unauthorized("User not found".into()));
    }

    Ok(Json(issue_tokens(&keys, claims.sub)?))
}

#[instrument]
pub async fn protected(AuthUser(user_id): AuthUser) -> Json<ProtectedResponse> {
    Json(ProtectedResponse { user_id })
}

fn issue_tokens(keys: &JwtKeys, user_id: Uuid) -> anyhow::Result<TokenResponse> {
    Ok(TokenResponse {
        access_token: keys.sign_access(user_id)?,
        refresh_token: keys.sign_refresh(user_id)?,
    })
}
