use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

use super::dto::{UpdateProfileRequest, UserResponse};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/users", get(list_users))
        .route("/users/:id", delete(delete_user))
}

#[instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = services::get_profile(&state, &user_id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
async fn update_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = services::update_profile(&state, &user_id, payload).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = services::list_users(&state, &user_id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
async fn delete_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services::delete_user(&state, &user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
