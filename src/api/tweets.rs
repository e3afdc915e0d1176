use axum::{extract::State, response::Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ok, ApiJson, ApiPath};
use crate::{
    app_state::AppState,
    core::{MediaId, TweetId},
    error::AppResult,
    infrastructure::middleware::Viewer,
    models::TweetView,
};

/// Body of `POST /tweets`. The `tweet_*` names are accepted for older clients.
#[derive(Debug, Deserialize)]
pub struct CreateTweetRequest {
    #[serde(alias = "tweet_data")]
    pub content: String,
    #[serde(default, alias = "tweet_media_ids")]
    pub media_ids: Vec<MediaId>,
}

pub async fn list_tweets_handler(
    State(state): State<AppState>,
    viewer: Viewer,
) -> AppResult<Json<Value>> {
    let tweets = state.content.get_tweets_for_user(viewer.id).await?;
    Ok(Json(json!({ "result": true, "tweets": tweets })))
}

pub async fn create_tweet_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiJson(req): ApiJson<CreateTweetRequest>,
) -> AppResult<Json<Value>> {
    let tweet_id = state
        .content
        .post_tweet_with_media(viewer.id, &req.content, &req.media_ids)
        .await?;
    Ok(Json(json!({ "result": true, "tweet_id": tweet_id })))
}

/// The tweet view itself, not wrapped in a result envelope
pub async fn get_tweet_handler(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<TweetId>,
) -> AppResult<Json<TweetView>> {
    let tweet = state.content.get_tweet(id).await?;
    Ok(Json(tweet))
}

pub async fn delete_tweet_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<TweetId>,
) -> AppResult<Json<Value>> {
    state.content.delete_tweet(viewer.id, id).await?;
    Ok(ok())
}

pub async fn like_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<TweetId>,
) -> AppResult<Json<Value>> {
    state.engagement.like(viewer.id, id).await?;
    Ok(ok())
}

pub async fn unlike_handler(
    State(state): State<AppState>,
    viewer: Viewer,
    ApiPath(id): ApiPath<TweetId>,
) -> AppResult<Json<Value>> {
    state.engagement.unlike(viewer.id, id).await?;
    Ok(ok())
}
