use std::sync::Arc;
use tracing::{info, instrument};

use crate::core::UserId;
use crate::error::{AppError, AppResult};
use crate::infrastructure::DatabaseInterface;

/// Follow and unfollow. Pair uniqueness and target existence are decided by the
/// store's constraints, not by a read before the write.
#[derive(Clone)]
pub struct SocialGraphService {
    store: Arc<dyn DatabaseInterface>,
}

impl SocialGraphService {
    pub fn new(store: Arc<dyn DatabaseInterface>) -> Self {
        Self { store }
    }

    #[instrument(skip(self))]
    pub async fn follow(&self, actor: UserId, target: UserId) -> AppResult<()> {
        if actor == target {
            return Err(AppError::SelfFollow);
        }
        self.store.create_follow(actor, target).await?;
        info!("User {} now follows {}", actor, target);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn unfollow(&self, actor: UserId, target: UserId) -> AppResult<()> {
        if !self.store.delete_follow(actor, target).await? {
            return Err(AppError::NoSuchFollow(target));
        }
        info!("User {} unfollowed {}", actor, target);
        Ok(())
    }
}
