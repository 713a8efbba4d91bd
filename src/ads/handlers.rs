use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::auth::jwt::AuthUser;
use crate::errors::AppError;
use crate::state::AppState;

use super::dto::{AdListResponse, AdRequest, AdResponse, ListQuery};
use super::services;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ads", get(list_ads).post(create_ad))
        .route("/ads/:id", get(get_ad).put(update_ad).delete(delete_ad))
        .route("/me/ads", get(my_ads))
}

#[instrument(skip(state))]
async fn list_ads(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<AdListResponse>, AppError> {
    let page = services::list_ads(&state, &query).await?;
    Ok(Json(page.into()))
}

#[instrument(skip(state))]
async fn get_ad(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AdResponse>, AppError> {
    let ad = services::get_ad(&state, &id).await?;
    Ok(Json(ad.into()))
}

#[instrument(skip(state, payload))]
async fn create_ad(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<AdRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AdResponse>), AppError> {
    let ad = services::create_ad(&state, &user_id, payload.into_draft()).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = format!("/api/v1/ads/{}", ad.id).parse() {
        headers.insert(axum::http::header::LOCATION, location);
    }
    Ok((StatusCode::CREATED, headers, Json(ad.into())))
}

#[instrument(skip(state, payload))]
async fn update_ad(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<AdRequest>,
) -> Result<Json<AdResponse>, AppError> {
    let ad = services::edit_ad(&state, &user_id, &id, payload.into_draft()).await?;
    Ok(Json(ad.into()))
}

#[instrument(skip(state))]
async fn delete_ad(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    services::delete_ad(&state, &user_id, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn my_ads(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<AdListResponse>, AppError> {
    let page = services::my_ads(&state, &user_id, &query).await?;
    Ok(Json(page.into()))
}
