use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::{MediaId, TweetId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::{BlobStore, DatabaseInterface};
use crate::models::TweetView;
use crate::services::feed::FeedService;

/// Upload content types accepted for media
pub const ACCEPTED_MEDIA_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Reject uploads whose declared content type is missing or not an accepted image format
pub fn check_media_type(content_type: Option<&str>) -> AppResult<()> {
    let Some(raw) = content_type else {
        return Err(AppError::BadMedia("missing content type".to_string()));
    };
    let essence = raw.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    if ACCEPTED_MEDIA_TYPES.contains(&essence.as_str()) {
        Ok(())
    } else {
        Err(AppError::BadMedia(format!(
            "{} (accepted: {})",
            raw,
            ACCEPTED_MEDIA_TYPES.join(", ")
        )))
    }
}

/// Tweets and their media
#[derive(Clone)]
pub struct ContentService {
    store: Arc<dyn DatabaseInterface>,
    blobs: Arc<dyn BlobStore>,
    feed: FeedService,
}

impl ContentService {
    pub fn new(store: Arc<dyn DatabaseInterface>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            feed: FeedService::new(store.clone()),
            store,
            blobs,
        }
    }

    #[instrument(skip(self, content))]
    pub async fn post_tweet(&self, actor: UserId, content: &str) -> AppResult<TweetId> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("tweet content must not be empty".to_string()));
        }
        let id = self.store.create_tweet(actor, content).await?;
        info!("User {} posted tweet {}", actor, id);
        Ok(id)
    }

    /// Link uploaded media to `tweet`, in the given order. Runs as one transaction;
    /// ids that do not exist or are already attached elsewhere are skipped.
    /// Returns the ids that were attached.
    #[instrument(skip(self))]
    pub async fn attach_media(
        &self,
        tweet: TweetId,
        media_ids: &[MediaId],
    ) -> AppResult<Vec<MediaId>> {
        if media_ids.is_empty() {
            return Ok(Vec::new());
        }
        let attached = self.store.attach_media(tweet, media_ids).await?;
        for id in media_ids.iter().filter(|id| !attached.contains(id)) {
            warn!("Media {} is unknown or already attached, not linked to tweet {}", id, tweet);
        }
        Ok(attached)
    }

    /// Create a tweet and attach previously uploaded media to it
    pub async fn post_tweet_with_media(
        &self,
        actor: UserId,
        content: &str,
        media_ids: &[MediaId],
    ) -> AppResult<TweetId> {
        let tweet = self.post_tweet(actor, content).await?;
        self.attach_media(tweet, media_ids).await?;
        Ok(tweet)
    }

    #[instrument(skip(self))]
    pub async fn delete_tweet(&self, actor: UserId, tweet: TweetId) -> AppResult<()> {
        let existing = self
            .store
            .get_tweet(tweet)
            .await?
            .ok_or(AppError::NoSuchTweet(tweet))?;
        if existing.author_id != actor {
            return Err(AppError::Forbidden(tweet));
        }
        // The delete is scoped to the author as well, so a concurrent delete shows up as missing
        if !self.store.delete_tweet(tweet, actor).await? {
            return Err(AppError::NoSuchTweet(tweet));
        }
        info!("User {} deleted tweet {}", actor, tweet);
        Ok(())
    }

    pub async fn get_tweet(&self, tweet: TweetId) -> AppResult<TweetView> {
        self.feed.tweet(tweet).await
    }

    pub async fn get_tweets_for_user(&self, actor: UserId) -> AppResult<Vec<TweetView>> {
        self.feed.tweets_by_author(actor).await
    }

    /// Validate, persist the bytes, and record an unattached media row pointing at them
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_media(
        &self,
        filename: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> AppResult<MediaId> {
        check_media_type(content_type)?;
        if bytes.is_empty() {
            return Err(AppError::BadMedia("empty file".to_string()));
        }
        let reference = self.blobs.store(filename, bytes).await?;
        let id = match self.store.create_media(&reference).await {
            Ok(id) => id,
            Err(e) => {
                // Nothing points at the blob without its row
                if let Err(cleanup) = self.blobs.remove(&reference).await {
                    warn!("Orphaned blob {} left behind: {}", reference, cleanup);
                }
                return Err(e);
            }
        };
        info!("Stored media {} as {}", id, reference);
        Ok(id)
    }
}
