use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::errors::AppError;
use crate::state::AppState;

use super::dto::{AuthResponse, LoginRequest, MessageResponse, RefreshRequest, RegisterRequest};
use super::jwt::AuthUser;
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verify/:token", get(verify_email))
        .route("/auth/resend-verification", post(resend_verification))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let (access_token, refresh_token, user) = services::register(&state, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            refresh_token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (access_token, refresh_token, user) =
        services::login(&state, &payload.email, &payload.password).await?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, payload))]
async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (access_token, refresh_token, user) =
        services::refresh(&state, &payload.refresh_token).await?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    }))
}

#[instrument(skip(state, token))]
async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    services::verify_email(&state, &token).await?;
    Ok(Json(MessageResponse {
        message: "Email verified. You can now use your account.".into(),
    }))
}

#[instrument(skip(state))]
async fn resend_verification(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MessageResponse>, AppError> {
    let sent = services::resend_verification(&state, &user_id).await?;
    let message = if sent {
        "Verification email sent."
    } else {
        "Email is already verified."
    };
    Ok(Json(MessageResponse {
        message: message.into(),
    }))
}
