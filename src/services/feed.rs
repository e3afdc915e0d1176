// Feed assembly - composes tweets and users into the nested views returned to callers.
// Every view comes from a single eager read in the store, never from per-tweet lookups.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::{TweetId, UserId};
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;
use crate::models::{
    LikerRef, TweetFilter, TweetRows, TweetView, User, UserGraph, UserProfile, UserRef,
};

#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn DatabaseInterface>,
}

impl FeedService {
    pub fn new(store: Arc<dyn DatabaseInterface>) -> Self {
        Self { store }
    }

    pub async fn tweet(&self, id: TweetId) -> AppResult<TweetView> {
        let rows = self.store.load_tweets(TweetFilter::ById(id)).await?;
        assemble_tweets(rows)
            .into_iter()
            .next()
            .ok_or(AppError::NoSuchTweet(id))
    }

    /// All tweets by `author`, oldest first
    pub async fn tweets_by_author(&self, author: UserId) -> AppResult<Vec<TweetView>> {
        let rows = self.store.load_tweets(TweetFilter::ByAuthor(author)).await?;
        Ok(assemble_tweets(rows))
    }

    pub async fn user_profile(&self, id: UserId) -> AppResult<UserProfile> {
        self.store
            .load_user_graph(id)
            .await?
            .map(profile_from_graph)
            .ok_or(AppError::NoSuchUser(id))
    }

    /// Profile of an already-resolved caller
    pub async fn current_user_profile(&self, viewer: &User) -> AppResult<UserProfile> {
        self.user_profile(viewer.id).await
    }
}

/// Group attachment and like rows under their tweets. Input order is preserved
/// within each group, so ordering is whatever the store query imposed.
pub fn assemble_tweets(rows: TweetRows) -> Vec<TweetView> {
    let mut attachments: HashMap<TweetId, Vec<String>> = HashMap::new();
    for row in rows.attachments {
        attachments.entry(row.tweet_id).or_default().push(row.name);
    }

    let mut likes: HashMap<TweetId, Vec<LikerRef>> = HashMap::new();
    for row in rows.likes {
        likes.entry(row.tweet_id).or_default().push(LikerRef {
            user_id: row.user_id,
            name: row.name,
        });
    }

    rows.tweets
        .into_iter()
        .map(|tweet| TweetView {
            id: tweet.id,
            attachments: attachments.remove(&tweet.id).unwrap_or_default(),
            likes: likes.remove(&tweet.id).unwrap_or_default(),
            author: UserRef {
                id: tweet.author_id,
                name: tweet.author_name,
            },
            content: tweet.content,
        })
        .collect()
}

fn profile_from_graph(graph: UserGraph) -> UserProfile {
    UserProfile {
        id: graph.user.id,
        name: graph.user.name,
        followers: graph.followers,
        following: graph.following,
    }
}
