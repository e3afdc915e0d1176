use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::infrastructure::security::hash_password;
use crate::infrastructure::DatabaseInterface;
use crate::models::User;

/// Maps API keys to users and registers new accounts
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn DatabaseInterface>,
}

impl IdentityService {
    pub fn new(store: Arc<dyn DatabaseInterface>) -> Self {
        Self { store }
    }

    /// Look up the user owning `api_key`. An empty or unknown key is `Unauthorized`.
    pub async fn resolve(&self, api_key: &str) -> AppResult<User> {
        if api_key.is_empty() {
            return Err(AppError::Unauthorized);
        }
        self.store
            .get_user_by_api_key(api_key)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    #[instrument(skip(self, password, api_key))]
    pub async fn register(&self, name: &str, password: &str, api_key: &str) -> AppResult<User> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        if api_key.is_empty() {
            return Err(AppError::Validation("api_key must not be empty".to_string()));
        }

        // Argon2 blocks for a noticeable time, run it off the async workers
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))??;
        let user = self.store.create_user(name, api_key, &password_hash).await?;
        info!("Registered user {} ({})", user.id, user.name);
        Ok(user)
    }
}
