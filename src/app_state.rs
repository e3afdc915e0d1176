use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{initialize_database, BlobStore, DatabaseInterface, LocalBlobStore},
    services::{ContentService, EngagementService, FeedService, IdentityService, SocialGraphService},
};

/// Shared handles for request handlers. Cloning is cheap; every service points at the same store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DatabaseInterface>,
    pub identity: IdentityService,
    pub social: SocialGraphService,
    pub content: ContentService,
    pub engagement: EngagementService,
    pub feed: FeedService,
}

impl AppState {
    pub async fn new(config: &Config) -> AppResult<Self> {
        let store = initialize_database(&config.database).await?;
        let blobs = Arc::new(LocalBlobStore::from_config(&config.media));
        Ok(Self::from_parts(store, blobs))
    }

    pub fn from_parts(store: Arc<dyn DatabaseInterface>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            identity: IdentityService::new(store.clone()),
            social: SocialGraphService::new(store.clone()),
            content: ContentService::new(store.clone(), blobs),
            engagement: EngagementService::new(store.clone()),
            feed: FeedService::new(store.clone()),
            store,
        }
    }
}
