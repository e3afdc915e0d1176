use serde::{Deserialize, Serialize};

use crate::core::{TweetId, UserId};

/// Minimal identity of a user as it appears inside other views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikerRef {
    pub user_id: UserId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetView {
    pub id: TweetId,
    pub content: String,
    pub attachments: Vec<String>,
    pub author: UserRef,
    pub likes: Vec<LikerRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub followers: Vec<UserRef>,
    pub following: Vec<UserRef>,
}
