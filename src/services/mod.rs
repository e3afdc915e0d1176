// Business services - every rule about users, follows, tweets and likes lives here.
// Each service is a cheap-to-clone handle around the shared entity store.

pub mod content;
pub mod engagement;
pub mod feed;
pub mod identity;
pub mod social_graph;

pub use content::{check_media_type, ContentService, ACCEPTED_MEDIA_TYPES};
pub use engagement::EngagementService;
pub use feed::FeedService;
pub use identity::IdentityService;
pub use social_graph::SocialGraphService;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::infrastructure::{DatabaseInterface, SqliteDatabase};
    use crate::models::User;

    pub async fn memory_store() -> Arc<dyn DatabaseInterface> {
        Arc::new(SqliteDatabase::new_in_memory().await.unwrap())
    }

    pub async fn user(store: &Arc<dyn DatabaseInterface>, name: &str) -> User {
        store
            .create_user(name, &format!("{}-key", name), "hash")
            .await
            .unwrap()
    }
}
