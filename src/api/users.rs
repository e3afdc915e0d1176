use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ok, ApiJson, ApiPath};
use crate::{
    app_state::AppState, core::UserId, error::AppResult, infrastructure::middleware::Viewer,
};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
    pub api_key: String,
}

pub async fn create_user_handler(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> AppResult<Json<Value>> {
    let user = state
        .identity
        .register(&req.name, &req.password, &req.api_key)
        .await?;
    Ok(Json(json!({
        "id": user.id,
        "name": user.name,
        "api_key": user.api_key,
    })))
}

pub async fn get_me_handler(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<Value>> {
    let profile = state.feed.current_user_profile(&viewer).await?;
    Ok(Json(json!({ "result": true, "user": profile })))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<UserId>,
) -> AppResult<Json<Value>> {
    let profile = state.feed.user_profile(id).await?;
    Ok(Json(json!({ "result": true, "user": profile })))
}

pub async fn follow_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(target): ApiPath<UserId>,
) -> AppResult<Json<Value>> {
    state.social.follow(viewer.id, target).await?;
    Ok(ok())
}

pub async fn unfollow_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(target): ApiPath<UserId>,
) -> AppResult<Json<Value>> {
    state.social.unfollow(viewer.id, target).await?;
    Ok(ok())
}
