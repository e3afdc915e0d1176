use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::{TweetId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;

/// Likes. "At most one like per user and tweet" is enforced by the store's
/// unique index; a violation surfaces as `DuplicateLike`.
#[derive(Clone)]
pub struct EngagementService {
    store: Arc<dyn DatabaseInterface>,
}

impl EngagementService {
    pub fn new(store: Arc<dyn DatabaseInterface>) -> Self {
        Self { store }
    }

    async fn ensure_tweet(&self, tweet: TweetId) -> AppResult<()> {
        match self.store.get_tweet(tweet).await? {
            Some(_) => Ok(()),
            None => Err(AppError::NoSuchTweet(tweet)),
        }
    }

    #[instrument(skip(self))]
    pub async fn like(&self, actor: UserId, tweet: TweetId) -> AppResult<()> {
        self.ensure_tweet(tweet).await?;
        self.store.create_like(actor, tweet).await?;
        info!("User {} liked tweet {}", actor, tweet);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unlike(&self, actor: UserId, tweet: TweetId) -> AppResult<()> {
        self.ensure_tweet(tweet).await?;
        if !self.store.delete_like(actor, tweet).await? {
            return Err(AppError::NoSuchLike(tweet));
        }
        info!("User {} unliked tweet {}", actor, tweet);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{memory_store, user};

    #[tokio::test]
    async fn test_like_and_unlike_once() {
        let store = memory_store().await;
        let engagement = EngagementService::new(store.clone());
        let a = user(&store, "a").await;
        let tweet = store.create_tweet(a.id, "hello").await.unwrap();

        engagement.like(a.id, tweet).await.unwrap();
        assert!(matches!(
            engagement.like(a.id, tweet).await,
            Err(AppError::DuplicateLike(id)) if id == tweet
        ));

        engagement.unlike(a.id, tweet).await.unwrap();
        assert!(matches!(
            engagement.unlike(a.id, tweet).await,
            Err(AppError::NoSuchLike(id)) if id == tweet
        ));
    }

    #[tokio::test]
    async fn test_missing_tweet() {
        let store = memory_store().await;
        let engagement = EngagementService::new(store.clone());
        let a = user(&store, "a").await;

        assert!(matches!(
            engagement.like(a.id, TweetId::new(5)).await,
            Err(AppError::NoSuchTweet(_))
        ));
        assert!(matches!(
            engagement.unlike(a.id, TweetId::new(5)).await,
            Err(AppError::NoSuchTweet(_))
        ));
    }

    #[tokio::test]
    async fn test_likes_are_per_user() {
        let store = memory_store().await;
        let engagement = EngagementService::new(store.clone());
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;
        let tweet = store.create_tweet(a.id, "hello").await.unwrap();

        engagement.like(a.id, tweet).await.unwrap();
        engagement.like(b.id, tweet).await.unwrap();
        engagement.unlike(b.id, tweet).await.unwrap();
        assert!(matches!(
            engagement.unlike(b.id, tweet).await,
            Err(AppError::NoSuchLike(_))
        ));
        // a's like is untouched
        assert!(matches!(
            engagement.like(a.id, tweet).await,
            Err(AppError::DuplicateLike(_))
        ));
    }
}
