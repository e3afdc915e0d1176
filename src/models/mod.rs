// Entity records - one plain struct per table, plus the raw rows the feed read returns

pub mod feed_models;

pub use feed_models::{LikerRef, TweetView, UserProfile, UserRef};

use crate::core::{MediaId, TweetId, UserId};

/// A registered account. Not serializable: responses go through `UserRef` or
/// dedicated DTOs so the password hash is never echoed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub api_key: String,
    pub password_hash: String,
}

impl User {
    pub fn to_ref(&self) -> UserRef {
        UserRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tweet {
    pub id: TweetId,
    pub author_id: UserId,
    pub content: String,
}

/// Uploaded image. `tweet_id` stays `None` until the media is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub id: MediaId,
    pub name: String,
    pub tweet_id: Option<TweetId>,
}

/// Which tweets a feed read should load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweetFilter {
    ById(TweetId),
    ByAuthor(UserId),
}

/// Tweet joined with its author's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetRow {
    pub id: TweetId,
    pub content: String,
    pub author_id: UserId,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRow {
    pub tweet_id: TweetId,
    pub name: String,
}

/// Like joined with the liking user's name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeRow {
    pub tweet_id: TweetId,
    pub user_id: UserId,
    pub name: String,
}

/// Result of one eager feed read. Rows are already ordered
/// (tweets by id, attachments by media id, likes by like id).
#[derive(Debug, Clone, Default)]
pub struct TweetRows {
    pub tweets: Vec<TweetRow>,
    pub attachments: Vec<AttachmentRow>,
    pub likes: Vec<LikeRow>,
}

/// A user with both directions of the follow graph, read in one transaction
#[derive(Debug, Clone)]
pub struct UserGraph {
    pub user: User,
    pub followers: Vec<UserRef>,
    pub following: Vec<UserRef>,
}
