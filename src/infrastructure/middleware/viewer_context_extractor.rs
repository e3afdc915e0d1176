// Viewer extractor - resolves the `api-key` header into the acting user for handlers

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::app_state::AppState;
use crate::error::AppError;
use crate::models::User;

pub const API_KEY_HEADER: &str = "api-key";

/// The authenticated caller. Handlers that take a `Viewer` require a valid API key;
/// the acting user id always comes from here, never from the request body.
#[derive(Debug, Clone)]
pub struct Viewer(pub User);

// Access the user's fields directly, e.g. `viewer.id`
impl std::ops::Deref for Viewer {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let user = state.identity.resolve(api_key).await?;
        Ok(Viewer(user))
    }
}
