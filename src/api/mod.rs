// HTTP surface - thin handlers that resolve the caller and call exactly one service

pub mod medias;
pub mod tweets;
pub mod users;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRequest, FromRequestParts, Path, Request, State,
    },
    http::request::Parts,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    app_state::AppState,
    error::{AppError, AppResult},
};

/// JSON body extractor whose rejections use the regular error body
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(ApiJson(value))
    }
}

/// Path extractor whose rejections use the regular error body
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| AppError::Validation(e.body_text()))?;
        Ok(ApiPath(value))
    }
}

pub(crate) fn ok() -> Json<Value> {
    Json(json!({ "result": true }))
}

pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    state.store.health_check().await?;
    Ok(ok())
}

/// All API routes; the caller decides where to mount them
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/users", post(users::create_user_handler))
        .route("/users/me", get(users::get_me_handler))
        .route("/users/{id}", get(users::get_user_handler))
        .route(
            "/users/{id}/follow",
            post(users::follow_handler).delete(users::unfollow_handler),
        )
        .route(
            "/tweets",
            get(tweets::list_tweets_handler).post(tweets::create_tweet_handler),
        )
        .route(
            "/tweets/{id}",
            get(tweets::get_tweet_handler).delete(tweets::delete_tweet_handler),
        )
        .route(
            "/tweets/{id}/likes",
            post(tweets::like_handler).delete(tweets::unlike_handler),
        )
        .route("/medias", post(medias::upload_media_handler))
        .with_state(state)
}
